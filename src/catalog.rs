//! Catalog query semantics shared by both storage backends.
//!
//! The in-memory backend evaluates a [`ProductQuery`] directly against its
//! product list; the PostgreSQL backend renders the same query to SQL.

use crate::models::{Product, ProductInput, ProductListParams};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Exclusive upper bound for prices and order amounts (`NUMERIC(10, 2)`).
pub const MAX_AMOUNT: Decimal = dec!(100000000);

/// Cents are the finest unit stored.
pub const AMOUNT_SCALE: u32 = 2;

/// Returns true when `amount` fits a price column exactly: at most two
/// decimal places and below [`MAX_AMOUNT`] in magnitude.
#[must_use]
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_SCALE && amount.abs() < MAX_AMOUNT
}

/// Fixed set of product orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Alphabetical by name.
    NameAsc,
    /// Reverse alphabetical by name.
    NameDesc,
}

impl SortOrder {
    /// Parses a wire sort key. Unknown keys yield `None`, meaning source order.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "name-asc" => Some(Self::NameAsc),
            "name-desc" => Some(Self::NameDesc),
            _ => None,
        }
    }

    /// Compares two products under this ordering.
    #[must_use]
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => a.name.cmp(&b.name),
            Self::NameDesc => b.name.cmp(&a.name),
        }
    }

    /// SQL `ORDER BY` clause for this ordering. Ties fall back to id so the
    /// result matches the stable in-memory sort.
    #[must_use]
    pub const fn order_by(&self) -> &'static str {
        match self {
            Self::PriceAsc => "ORDER BY price ASC, id ASC",
            Self::PriceDesc => "ORDER BY price DESC, id ASC",
            Self::NameAsc => "ORDER BY name ASC, id ASC",
            Self::NameDesc => "ORDER BY name DESC, id ASC",
        }
    }
}

/// A normalized product listing query.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Exact category to keep.
    pub category: Option<String>,
    /// Lowercased search term.
    pub search: Option<String>,
    /// Requested ordering.
    pub sort: Option<SortOrder>,
}

impl ProductQuery {
    /// Builds a query from raw request parameters, dropping the `all`
    /// sentinel and empty values.
    #[must_use]
    pub fn from_params(params: &ProductListParams) -> Self {
        let category = params
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        let search = params
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let sort = params.sort.as_deref().and_then(SortOrder::parse);

        Self {
            category,
            search,
            sort,
        }
    }

    /// Returns true when the product passes the category and search filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && product.category != *category
        {
            return false;
        }

        if let Some(term) = &self.search {
            return product.name.to_lowercase().contains(term.as_str())
                || product.description.to_lowercase().contains(term.as_str());
        }

        true
    }

    /// Filters and sorts products, keeping source order when no sort applies.
    #[must_use]
    pub fn apply<'a, I>(&self, products: I) -> Vec<Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut result: Vec<Product> = products
            .into_iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        if let Some(sort) = self.sort {
            result.sort_by(|a, b| sort.compare(a, b));
        }

        result
    }
}

/// Distinct categories in alphabetical order.
#[must_use]
pub fn distinct_categories<'a, I>(products: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Product>,
{
    products
        .into_iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Escapes `%`, `_` and `\` so a search term is matched literally by `LIKE`.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Checks admin-supplied product fields: non-empty name and category,
/// non-negative stock, and a non-negative price in whole cents below
/// [`MAX_AMOUNT`].
///
/// # Errors
/// Returns a description of the first invalid field.
pub fn validate_product_input(input: &ProductInput) -> Result<(), String> {
    if input.name.trim().is_empty() {
        return Err("product name is required".to_string());
    }
    if input.category.trim().is_empty() {
        return Err("product category is required".to_string());
    }
    if input.price < Decimal::ZERO {
        return Err(format!("price {} must not be negative", input.price));
    }
    if !is_storable_amount(input.price) {
        return Err(format!(
            "price {} must have at most {} decimal places and be below {}",
            input.price, AMOUNT_SCALE, MAX_AMOUNT
        ));
    }
    if input.stock < 0 {
        return Err(format!("stock {} must not be negative", input.stock));
    }
    Ok(())
}
