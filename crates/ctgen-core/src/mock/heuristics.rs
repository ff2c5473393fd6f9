use heck::ToSnakeCase;

/// Realistic value families recognised from a field name or `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Email,
    Phone,
    Url,
    Uuid,
    Identifier,
    FirstName,
    LastName,
    FullName,
    Username,
    Street,
    City,
    Country,
    CountryCode,
    PostalCode,
    Date,
    DateTime,
    Time,
    Company,
    CurrencyCode,
    Locale,
    IpAddress,
    Hostname,
    Password,
    Latitude,
    Longitude,
    Price,
    Quantity,
    Age,
    Description,
}

pub const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
];

pub const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Allen", "Dijkstra",
];

pub const CITIES: &[&str] = &[
    "Lisbon", "Toronto", "Melbourne", "Osaka", "Nairobi", "Berlin", "Denver", "Oslo",
];

pub const COUNTRIES: &[(&str, &str)] = &[
    ("Portugal", "PT"),
    ("Canada", "CA"),
    ("Australia", "AU"),
    ("Japan", "JP"),
    ("Kenya", "KE"),
    ("Germany", "DE"),
    ("United States", "US"),
    ("Norway", "NO"),
];

pub const STREETS: &[&str] = &[
    "Main Street", "Elm Avenue", "Harbour Road", "Maple Lane", "Station Square",
];

pub const COMPANIES: &[&str] = &[
    "Acme Corp", "Globex", "Initech", "Umbrella Labs", "Stark Industries",
];

pub const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "test.io"];

pub const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CAD"];

pub const LOCALES: &[&str] = &["en-US", "pt-PT", "de-DE", "ja-JP", "fr-CA"];

pub const WORDS: &[&str] = &[
    "alpha", "bravo", "delta", "ember", "harbor", "lumen", "nova", "quartz", "summit", "vertex",
];

/// Detect the value family of a field. `format` wins over the name.
pub fn detect(field_name: &str, format: Option<&str>) -> Option<ValueKind> {
    if let Some(kind) = format.and_then(from_format) {
        return Some(kind);
    }
    from_name(&field_name.to_snake_case())
}

fn from_format(format: &str) -> Option<ValueKind> {
    Some(match format {
        "email" | "idn-email" => ValueKind::Email,
        "uri" | "url" | "uri-reference" | "iri" => ValueKind::Url,
        "uuid" => ValueKind::Uuid,
        "date" => ValueKind::Date,
        "date-time" => ValueKind::DateTime,
        "time" => ValueKind::Time,
        "ipv4" | "ipv6" => ValueKind::IpAddress,
        "hostname" | "idn-hostname" => ValueKind::Hostname,
        "password" => ValueKind::Password,
        _ => return None,
    })
}

fn from_name(name: &str) -> Option<ValueKind> {
    let has = |needle: &str| name.contains(needle);
    let ends = |suffix: &str| name == suffix || name.ends_with(&format!("_{suffix}"));

    Some(if has("email") || has("e_mail") {
        ValueKind::Email
    } else if has("phone") || has("mobile") {
        ValueKind::Phone
    } else if has("url") || ends("uri") || has("website") || has("href") {
        ValueKind::Url
    } else if has("uuid") || has("guid") {
        ValueKind::Uuid
    } else if ends("ip") || has("ip_address") {
        ValueKind::IpAddress
    } else if ends("id") {
        ValueKind::Identifier
    } else if has("first_name") || has("given_name") {
        ValueKind::FirstName
    } else if has("last_name") || has("family_name") || has("surname") {
        ValueKind::LastName
    } else if has("username") || has("user_name") || has("login") {
        ValueKind::Username
    } else if ends("name") || has("full_name") || has("display_name") {
        ValueKind::FullName
    } else if has("street") || has("address") {
        ValueKind::Street
    } else if has("city") || has("town") {
        ValueKind::City
    } else if has("country_code") {
        ValueKind::CountryCode
    } else if has("country") {
        ValueKind::Country
    } else if has("zip") || has("postal") || has("postcode") {
        ValueKind::PostalCode
    } else if has("datetime") || has("timestamp") || ends("at") {
        ValueKind::DateTime
    } else if has("date") || has("birthday") || has("dob") {
        ValueKind::Date
    } else if has("company") || has("organization") || has("organisation") {
        ValueKind::Company
    } else if has("currency") {
        ValueKind::CurrencyCode
    } else if has("locale") || has("language") {
        ValueKind::Locale
    } else if has("hostname") || has("host") {
        ValueKind::Hostname
    } else if has("password") || has("secret") {
        ValueKind::Password
    } else if ends("lat") || has("latitude") {
        ValueKind::Latitude
    } else if ends("lng") || ends("lon") || has("longitude") {
        ValueKind::Longitude
    } else if has("price") || has("amount") || has("cost") || has("total") || has("balance") {
        ValueKind::Price
    } else if has("quantity") || has("qty") || has("count") || has("stock") {
        ValueKind::Quantity
    } else if ends("age") {
        ValueKind::Age
    } else if has("description") || has("comment") || has("note") || has("bio") {
        ValueKind::Description
    } else {
        return None;
    })
}

/// A value that violates `format`, or `None` when the format has no invalid form.
pub fn invalid_format_value(format: &str) -> Option<&'static str> {
    Some(match format {
        "email" | "idn-email" => "not-an-email",
        "uri" | "url" | "uri-reference" | "iri" => "not a url",
        "uuid" => "not-a-uuid",
        "date" => "2024-13-45",
        "date-time" => "2024-13-45T25:61:00Z",
        "time" => "25:61:00",
        "ipv4" => "999.999.999.999",
        "ipv6" => "gggg::1",
        "hostname" | "idn-hostname" => "-invalid-.host_name",
        "byte" => "***not-base64***",
        "int32" | "int64" => "not-a-number",
        _ => return None,
    })
}

/// True for formats `detect` maps to a temporal kind.
pub fn is_temporal_format(format: &str) -> bool {
    matches!(format, "date" | "date-time" | "time")
}
