//! # Range & Order Queries
//!
//! Parses the product listing filters and resolves them into a query plan.
//!
//! ## Pipeline
//! ```text
//! ?range=10.00..50.00&rangeby=eur&ordby=exp&ord=asc&name=Cheese
//!        │
//!        ▼
//! ProductQueryParams::from_pairs      syntax: every issue reported at once
//!        │
//!        ▼
//! ProductQuery::resolve               defaults, columns, boundary rescaling
//!        │
//!        ├──► storage layer           WHERE price_eur >= 1000
//!        │                              AND price_eur <  5000
//!        │                              AND name = 'Cheese'
//!        │                            ORDER BY expiration ASC, id ASC
//!        │
//!        └──► ProductQuery::execute   the same semantics, in memory
//! ```
//!
//! ## Range Syntax
//! `<start>..<end>`, with either side optional:
//!
//! | Text         | Start  | End    |
//! |--------------|--------|--------|
//! | `10..100`    | `10`   | `100`  |
//! | `..100`      | none   | `100`  |
//! | `1..`        | `1`    | none   |
//! | `0..10..90`  | rejected          |
//! | `10`         | rejected          |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use ts_rs::TS;

use crate::currency::CurrencyCode;
use crate::error::ValidationError;
use crate::fixed::{parse_precise_number, PreciseNumber};
use crate::types::Product;
use crate::validation::{validate_name_filter, RequestSegment, ValidationReport};

/// Separator between the two sides of a range.
pub const RANGE_SEPARATOR: &str = "..";

/// Direction used when a listing does not ask for one.
pub const DEFAULT_ORDER: Order = Order::Desc;

// =============================================================================
// Range
// =============================================================================

/// A possibly one-sided interval. `None` on a side means unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range<T> {
    pub start: Option<T>,
    pub end: Option<T>,
}

impl<T> Range<T> {
    pub fn new(start: Option<T>, end: Option<T>) -> Self {
        Range { start, end }
    }

    /// True when neither side is bounded.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Applies `f` to each present side. Stops at the first error.
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<Range<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Range {
            start: self.start.map(&mut f).transpose()?,
            end: self.end.map(&mut f).transpose()?,
        })
    }

    /// Half-open membership: `start <= value < end`.
    pub fn contains<V>(&self, value: &V) -> bool
    where
        V: PartialOrd<T>,
    {
        let after_start = self.start.as_ref().map_or(true, |start| value >= start);
        let before_end = self.end.as_ref().map_or(true, |end| value < end);
        after_start && before_end
    }
}

/// Splits `text` on [`RANGE_SEPARATOR`].
///
/// Returns `None` unless there is exactly one separator. An empty side is
/// unbounded. The sides are not inspected.
///
/// ## Example
/// ```rust
/// use pricebook_core::query::parse_range;
///
/// let range = parse_range("..100").unwrap();
/// assert_eq!(range.start, None);
/// assert_eq!(range.end.as_deref(), Some("100"));
///
/// assert!(parse_range("0..10..90").is_none());
/// ```
pub fn parse_range(text: &str) -> Option<Range<String>> {
    let (start, end) = text.split_once(RANGE_SEPARATOR)?;
    if end.contains(RANGE_SEPARATOR) {
        return None;
    }

    let side = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Some(Range::new(side(start), side(end)))
}

/// Parses a range of fixed digit amounts for `field`.
///
/// ## Errors
/// - [`ValidationError::MalformedFilter`] when the separator count is wrong
/// - [`ValidationError::InvalidAmount`] when a side is not a fixed digit
pub fn parse_amount_range(
    field: &str,
    text: &str,
) -> Result<Range<PreciseNumber>, ValidationError> {
    let range = parse_range(text).ok_or_else(|| ValidationError::MalformedFilter {
        field: field.to_string(),
        value: text.to_string(),
    })?;

    range.try_map(|side| {
        parse_precise_number(&side).map_err(|_| ValidationError::InvalidAmount {
            field: field.to_string(),
            value: side,
        })
    })
}

/// Parses a range of RFC 3339 timestamps for `field`.
///
/// ## Errors
/// - [`ValidationError::MalformedFilter`] when the separator count is wrong
/// - [`ValidationError::InvalidDate`] when a side is not a valid timestamp
pub fn parse_date_range(field: &str, text: &str) -> Result<Range<DateTime<Utc>>, ValidationError> {
    let range = parse_range(text).ok_or_else(|| ValidationError::MalformedFilter {
        field: field.to_string(),
        value: text.to_string(),
    })?;

    range.try_map(|side| {
        DateTime::parse_from_rfc3339(&side)
            .map(|date| date.with_timezone(&Utc))
            .map_err(|_| ValidationError::InvalidDate {
                field: field.to_string(),
                value: side,
            })
    })
}

// =============================================================================
// Order
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }

    /// Applies this direction to an ascending comparison.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "ord".to_string(),
                allowed: vec!["asc".to_string(), "desc".to_string()],
            }),
        }
    }
}

/// Lenient direction parse: anything but `asc`/`desc` yields `default`.
pub fn parse_order(text: Option<&str>, default: Order) -> Order {
    text.and_then(|text| text.parse().ok()).unwrap_or(default)
}

// =============================================================================
// Fields & Columns
// =============================================================================

/// Storage column a listing can filter or sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    PriceUsd,
    PriceEur,
    PriceJpy,
    PriceBrl,
    PriceBtc,
    Expiration,
    Id,
}

impl Column {
    /// Price column of a currency.
    pub const fn price(code: CurrencyCode) -> Self {
        match code {
            CurrencyCode::Usd => Column::PriceUsd,
            CurrencyCode::Eur => Column::PriceEur,
            CurrencyCode::Jpy => Column::PriceJpy,
            CurrencyCode::Brl => Column::PriceBrl,
            CurrencyCode::Btc => Column::PriceBtc,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Column::PriceUsd => "price_usd",
            Column::PriceEur => "price_eur",
            Column::PriceJpy => "price_jpy",
            Column::PriceBrl => "price_brl",
            Column::PriceBtc => "price_btc",
            Column::Expiration => "expiration",
            Column::Id => "id",
        }
    }

    /// Ascending comparison of two products on this column.
    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Column::PriceUsd => a.prices.usd.amount.cmp(&b.prices.usd.amount),
            Column::PriceEur => a.prices.eur.amount.cmp(&b.prices.eur.amount),
            Column::PriceJpy => a.prices.jpy.amount.cmp(&b.prices.jpy.amount),
            Column::PriceBrl => a.prices.brl.amount.cmp(&b.prices.brl.amount),
            Column::PriceBtc => a.prices.btc.amount.cmp(&b.prices.btc.amount),
            Column::Expiration => a.expiration.cmp(&b.expiration),
            Column::Id => a.id.cmp(&b.id),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field a listing can be ordered by (`ordby`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderField {
    Usd,
    Eur,
    Jpy,
    Brl,
    Btc,
    Exp,
}

impl OrderField {
    pub const ALL: [OrderField; 6] = [
        OrderField::Usd,
        OrderField::Eur,
        OrderField::Jpy,
        OrderField::Brl,
        OrderField::Btc,
        OrderField::Exp,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderField::Usd => "usd",
            OrderField::Eur => "eur",
            OrderField::Jpy => "jpy",
            OrderField::Brl => "brl",
            OrderField::Btc => "btc",
            OrderField::Exp => "exp",
        }
    }

    pub const fn column(&self) -> Column {
        match self {
            OrderField::Usd => Column::PriceUsd,
            OrderField::Eur => Column::PriceEur,
            OrderField::Jpy => Column::PriceJpy,
            OrderField::Brl => Column::PriceBrl,
            OrderField::Btc => Column::PriceBtc,
            OrderField::Exp => Column::Expiration,
        }
    }
}

impl FromStr for OrderField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "ordby".to_string(),
                allowed: OrderField::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })
    }
}

/// Currency a range filter applies to (`rangeby`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RangeField {
    Usd,
    Eur,
    Jpy,
    Brl,
    Btc,
}

impl RangeField {
    pub const ALL: [RangeField; 5] = [
        RangeField::Usd,
        RangeField::Eur,
        RangeField::Jpy,
        RangeField::Brl,
        RangeField::Btc,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            RangeField::Usd => "usd",
            RangeField::Eur => "eur",
            RangeField::Jpy => "jpy",
            RangeField::Brl => "brl",
            RangeField::Btc => "btc",
        }
    }

    pub const fn currency(&self) -> CurrencyCode {
        match self {
            RangeField::Usd => CurrencyCode::Usd,
            RangeField::Eur => CurrencyCode::Eur,
            RangeField::Jpy => CurrencyCode::Jpy,
            RangeField::Brl => CurrencyCode::Brl,
            RangeField::Btc => CurrencyCode::Btc,
        }
    }

    #[inline]
    pub const fn column(&self) -> Column {
        Column::price(self.currency())
    }
}

impl FromStr for RangeField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "rangeby".to_string(),
                allowed: RangeField::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Query Params
// =============================================================================

/// Validated listing parameters, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQueryParams {
    pub name: Option<String>,
    pub ord: Option<Order>,
    pub ordby: Option<OrderField>,
    pub range: Option<Range<PreciseNumber>>,
    pub rangeby: Option<RangeField>,
}

impl ProductQueryParams {
    /// Validates raw query string pairs.
    ///
    /// Unknown keys are ignored, empty values count as absent and a repeated
    /// key keeps its last value.
    ///
    /// ## Errors
    /// Every problem found, in key order.
    ///
    /// ## Example
    /// ```rust
    /// use pricebook_core::query::{OrderField, ProductQueryParams};
    ///
    /// let params = ProductQueryParams::from_pairs([("ordby", "exp"), ("page", "2")]).unwrap();
    /// assert_eq!(params.ordby, Some(OrderField::Exp));
    ///
    /// let errors = ProductQueryParams::from_pairs([("ord", "up"), ("range", "1..2..3")])
    ///     .unwrap_err();
    /// assert_eq!(errors.len(), 2);
    /// ```
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, Vec<ValidationError>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = ProductQueryParams::default();
        let mut errors = Vec::new();

        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }

            let parsed = match key {
                "name" => {
                    validate_name_filter(value).map(|()| params.name = Some(value.to_string()))
                }
                "ord" => value.parse().map(|ord| params.ord = Some(ord)),
                "ordby" => value.parse().map(|ordby| params.ordby = Some(ordby)),
                "rangeby" => value.parse().map(|rangeby| params.rangeby = Some(rangeby)),
                "range" => {
                    parse_amount_range("range", value).map(|range| params.range = Some(range))
                }
                _ => Ok(()),
            };

            if let Err(err) = parsed {
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(params)
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Product Query
// =============================================================================

/// A range filter over one currency column, boundaries in that currency's
/// smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    pub field: RangeField,
    pub range: Range<PreciseNumber>,
}

impl RangeFilter {
    #[inline]
    pub const fn column(&self) -> Column {
        self.field.column()
    }

    fn matches(&self, product: &Product) -> bool {
        let amount = &product.price(self.field.currency()).amount;
        let after_start = self.range.start.as_ref().map_or(true, |start| *amount >= start.amount);
        let before_end = self.range.end.as_ref().map_or(true, |end| *amount < end.amount);
        after_start && before_end
    }
}

/// A fully resolved product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Exact-match name filter.
    pub name: Option<String>,
    pub range: Option<RangeFilter>,
    pub order_column: Column,
    pub order: Order,
}

impl ProductQuery {
    /// Applies defaults and rescales range boundaries to the unit of the
    /// `rangeby` currency (`"10.5"` on JPY is rejected, `"10"` on BTC becomes
    /// `"10.00000000"`).
    ///
    /// ## Errors
    /// [`ValidationError::InvalidAmount`] when a boundary has more non-zero
    /// fractional digits than the currency allows.
    pub fn resolve(params: ProductQueryParams) -> Result<Self, ValidationError> {
        let field = params.rangeby.unwrap_or(RangeField::Usd);
        let unit = field.currency().unit();

        let range = params
            .range
            .map(|range| {
                range.try_map(|boundary| {
                    boundary.rescale_exact(unit).ok_or_else(|| ValidationError::InvalidAmount {
                        field: "range".to_string(),
                        value: boundary.to_string(),
                    })
                })
            })
            .transpose()?
            .filter(|range| !range.is_unbounded())
            .map(|range| RangeFilter { field, range });

        let query = ProductQuery {
            name: params.name,
            range,
            order_column: params.ordby.map_or(Column::Id, |ordby| ordby.column()),
            order: params.ord.unwrap_or(DEFAULT_ORDER),
        };

        debug!(
            name = ?query.name,
            range_column = ?query.range.as_ref().map(RangeFilter::column),
            order_column = %query.order_column,
            order = %query.order,
            "Resolved product query"
        );

        Ok(query)
    }

    /// Validates and resolves raw query string pairs in one step.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ValidationReport>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let params = ProductQueryParams::from_pairs(pairs)
            .map_err(|errors| ValidationReport::from_errors(RequestSegment::Query, errors))?;
        ProductQuery::resolve(params)
            .map_err(|err| ValidationReport::from_errors(RequestSegment::Query, [err]))
    }

    /// Runs the query over products held in memory. Ties on the order column
    /// are broken by id, in the same direction.
    pub fn execute<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut matched: Vec<&Product> = products
            .iter()
            .filter(|product| self.name.as_ref().map_or(true, |name| product.name == *name))
            .filter(|product| self.range.as_ref().map_or(true, |range| range.matches(product)))
            .collect();

        matched.sort_by(|a, b| {
            let ordering = self
                .order_column
                .compare(a, b)
                .then_with(|| a.id.cmp(&b.id));
            self.order.apply(ordering)
        });

        debug!(total = products.len(), matched = matched.len(), "Executed product query");
        matched
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
