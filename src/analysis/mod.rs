mod code_scan;
mod layout_scan;
mod seeder;

pub use code_scan::CodeUsageScanner;
pub use layout_scan::{LayoutScanStats, LayoutScanner};
pub use seeder::{RootSeeder, SeedStats};
