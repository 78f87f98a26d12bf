pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SESSION_FILE: &str = ".tapeat-session.json";

pub const CURRENCY: &str = "Frw";
pub const APP_TITLE: &str = "Tape & Eat";

pub const REQUIRED_FIELDS_MSG: &str = "Please fill all required fields";
pub const INVALID_CREDENTIALS_MSG: &str = "Invalid credentials.";
pub const ADMIN_NOT_FOUND_MSG: &str = "Admin not found.";
pub const RESTAURANT_NOT_FOUND_MSG: &str = "Restaurant not found.";
pub const ADMIN_EXISTS_MSG: &str = "Admin already exists.";
pub const CARD_EXISTS_MSG: &str = "Card number already exists.";

pub const RECENT_ACTIVITY_LIMIT: usize = 5;
pub const REVENUE_CHART_MONTHS: u32 = 6;
pub const REVENUE_CHART_DAYS: i64 = 7;

// A4 page; positions below are in millimetres
pub const PDF_PAGE_WIDTH_PT: f64 = 595.28;
pub const PDF_PAGE_HEIGHT_PT: f64 = 841.89;
pub const PDF_MARGIN_MM: f64 = 10.0;
pub const PDF_HEADER_Y_MM: f64 = 20.0;
pub const PDF_LINE_MM: f64 = 6.0;
pub const PDF_PAGE_BOTTOM_MM: f64 = 270.0;
pub const PDF_TITLE_SIZE: u32 = 14;
pub const PDF_TEXT_SIZE: u32 = 10;
