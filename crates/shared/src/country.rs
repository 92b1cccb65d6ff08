/// Country name to ISO code table. Unknown countries fall back to "xx",
/// which flag CDNs serve as the placeholder flag.
pub const COUNTRY_CODES: &[(&str, &str)] = &[
    ("United States", "us"),
    ("Canada", "ca"),
    ("United Kingdom", "gb"),
    ("Germany", "de"),
    ("France", "fr"),
    ("Japan", "jp"),
    ("India", "in"),
    ("Philippines", "ph"),
    ("Brazil", "br"),
    ("South Korea", "kr"),
];

pub const UNKNOWN_COUNTRY_CODE: &str = "xx";

pub fn code_for(country: &str) -> &'static str {
    let name = country.trim();
    COUNTRY_CODES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
        .unwrap_or(UNKNOWN_COUNTRY_CODE)
}
