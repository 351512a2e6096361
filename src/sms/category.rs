//! Merchant categorization by keyword

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spending category inferred from a merchant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
	Food,
	Travel,
	Shopping,
	Bills,
	Entertainment,
	Other,
}

impl Category {
	pub fn as_str(&self) -> &'static str {
		match self {
			Category::Food => "Food",
			Category::Travel => "Travel",
			Category::Shopping => "Shopping",
			Category::Bills => "Bills",
			Category::Entertainment => "Entertainment",
			Category::Other => "Other",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Keyword lists checked in order; the first category with a substring hit wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
	(
		Category::Food,
		&[
			"zomato", "swiggy", "restaurant", "cafe", "food", "mcdonald", "kfc", "domino", "pizza",
			"burger",
		],
	),
	(
		Category::Travel,
		&[
			"uber", "ola", "indigo", "spicejet", "airline", "irctc", "makemytrip", "goibibo",
			"rapido",
		],
	),
	(
		Category::Shopping,
		&[
			"amazon", "flipkart", "myntra", "ajio", "meesho", "shopping", "mall", "store", "mart",
		],
	),
	(
		Category::Bills,
		&[
			"electricity",
			"water",
			"gas",
			"broadband",
			"mobile",
			"recharge",
			"bill",
			"payment",
			"jio",
			"airtel",
			"vodafone",
		],
	),
	(
		Category::Entertainment,
		&[
			"netflix", "prime", "hotstar", "spotify", "youtube", "movie", "cinema", "pvr", "inox",
			"gaming",
		],
	),
];

/// Infer a spending category from a merchant name by keyword matching.
pub fn categorize_merchant(merchant: &str) -> Category {
	let lower = merchant.to_lowercase();
	CATEGORY_KEYWORDS
		.iter()
		.find(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
		.map(|(category, _)| *category)
		.unwrap_or(Category::Other)
}
