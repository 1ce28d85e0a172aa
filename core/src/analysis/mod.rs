pub mod analyzer;
pub mod crossing;
pub mod resistance;

pub use analyzer::JvAnalyzer;
pub use crossing::first_sign_change;
