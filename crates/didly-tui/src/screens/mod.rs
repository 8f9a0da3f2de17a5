pub mod numbers;
pub mod search;

pub use numbers::NumbersScreen;
pub use search::SearchScreen;
