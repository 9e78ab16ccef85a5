//! Translation of `page`, `size` and `sort` query parameters into a
//! [`PageRequest`] the stores understand.
//!
//! Parsing is lenient for numbers (bad values fall back to defaults) and
//! strict for sort properties, which end up in SQL and must come from a
//! fixed set.

use std::cmp::Ordering;

use crate::{cashcards::repo_types::CashCard, config::PagingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Amount,
    Owner,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Self::Id),
            "amount" => Some(Self::Amount),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Amount => "amount",
            Self::Owner => "owner",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: Direction,
}

/// Raw query string parameters for `GET /cashcards`. `sort` may repeat.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Vec<String>,
}

impl PageParams {
    /// Collects decoded `key=value` pairs, keeping every `sort` in order.
    /// For `page` and `size` the last occurrence wins; other keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => params.page = Some(value),
                "size" => params.size = Some(value),
                "sort" => params.sort.push(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort: Vec<SortOrder>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SortError {
    #[error("unknown sort property {0:?}")]
    UnknownProperty(String),
}

impl PageRequest {
    pub fn from_params(params: &PageParams, cfg: &PagingConfig) -> Result<Self, SortError> {
        let page = params
            .page
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|p| *p >= 0)
            .unwrap_or(0);
        let size = params
            .size
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|s| *s >= 1)
            .unwrap_or(cfg.default_size)
            .min(cfg.max_size);
        let mut sort = Vec::new();
        for raw in &params.sort {
            sort.extend(parse_sort(raw)?);
        }
        Ok(Self { page, size, sort })
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Requested orders followed by `id ASC` unless `id` is already a key.
    pub fn effective_sort(&self) -> Vec<SortOrder> {
        let mut orders = self.sort.clone();
        if !orders.iter().any(|o| o.field == SortField::Id) {
            orders.push(SortOrder {
                field: SortField::Id,
                direction: Direction::Asc,
            });
        }
        orders
    }

    /// `ORDER BY` body built only from whitelisted columns.
    pub fn order_by_clause(&self) -> String {
        self.effective_sort()
            .iter()
            .map(|o| format!("{} {}", o.field.column(), o.direction.keyword()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Orders two cards by `orders`, normally [`PageRequest::effective_sort`], so
/// stores that sort in process agree with [`PageRequest::order_by_clause`].
pub fn compare_cards(orders: &[SortOrder], a: &CashCard, b: &CashCard) -> Ordering {
    for order in orders {
        let ord = match order.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Owner => a.owner.cmp(&b.owner),
        };
        let ord = match order.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// One `sort` value: `amount,desc` / `owner,amount` / `owner,amount,DESC`.
/// Every token is a property except a trailing direction, which applies to
/// all properties of that value. Repeat `sort` for mixed directions.
fn parse_sort(raw: &str) -> Result<Vec<SortOrder>, SortError> {
    let mut tokens: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let direction = match tokens.last().and_then(|t| Direction::parse(t)) {
        Some(d) => {
            tokens.pop();
            d
        }
        None => Direction::Asc,
    };

    tokens
        .into_iter()
        .map(|t| {
            SortField::parse(t)
                .map(|field| SortOrder { field, direction })
                .ok_or_else(|| SortError::UnknownProperty(t.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn params(page: Option<&str>, size: Option<&str>, sort: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(Into::into),
            size: size.map(Into::into),
            sort: sort.into_iter().map(Into::into).collect(),
        }
    }

    fn cfg() -> PagingConfig {
        PagingConfig {
            default_size: 20,
            max_size: 100,
        }
    }

    #[test]
    fn defaults_when_no_params() {
        let req = PageRequest::from_params(&PageParams::default(), &cfg()).unwrap();
        assert_eq!(req.page, 0);
        assert_eq!(req.size, 20);
        assert!(req.sort.is_empty());
        assert_eq!(req.order_by_clause(), "id ASC");
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let req = PageRequest::from_params(&params(Some("-3"), Some("0"), None), &cfg()).unwrap();
        assert_eq!((req.page, req.size), (0, 20));

        let req = PageRequest::from_params(&params(Some("abc"), Some("x"), None), &cfg()).unwrap();
        assert_eq!((req.page, req.size), (0, 20));
    }

    #[test]
    fn size_is_clamped_to_max() {
        let req = PageRequest::from_params(&params(Some("2"), Some("5000"), None), &cfg()).unwrap();
        assert_eq!(req.size, 100);
        assert_eq!(req.offset(), 200);
    }

    #[test]
    fn parses_single_property_with_direction() {
        let req =
            PageRequest::from_params(&params(Some("0"), Some("1"), Some("amount,desc")), &cfg())
                .unwrap();
        assert_eq!(
            req.sort,
            vec![SortOrder {
                field: SortField::Amount,
                direction: Direction::Desc
            }]
        );
        assert_eq!(req.order_by_clause(), "amount DESC, id ASC");
    }

    #[test]
    fn trailing_direction_applies_to_every_property() {
        let req = PageRequest::from_params(&params(None, None, Some("owner,amount,DESC")), &cfg())
            .unwrap();
        assert_eq!(req.order_by_clause(), "owner DESC, amount DESC, id ASC");
    }

    #[test]
    fn property_without_direction_is_ascending() {
        let req = PageRequest::from_params(&params(None, None, Some("id")), &cfg()).unwrap();
        assert_eq!(req.order_by_clause(), "id ASC");
    }

    #[test]
    fn unknown_property_is_rejected() {
        let err = PageRequest::from_params(&params(None, None, Some("password,asc")), &cfg())
            .unwrap_err();
        assert_eq!(err, SortError::UnknownProperty("password".into()));
    }

    #[test]
    fn compare_matches_order_by() {
        let req = PageRequest::from_params(&params(None, None, Some("amount,desc")), &cfg()).unwrap();
        let mut cards = vec![
            CashCard { id: 1, amount: Decimal::new(100, 0), owner: "a".into() },
            CashCard { id: 2, amount: Decimal::new(200, 0), owner: "a".into() },
            CashCard { id: 3, amount: Decimal::new(100, 0), owner: "b".into() },
        ];
        let orders = req.effective_sort();
        cards.sort_by(|a, b| compare_cards(&orders, a, b));
        let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn repeated_sort_values_keep_their_own_direction() {
        let query = [
            ("sort", "owner,asc"),
            ("size", "5"),
            ("sort", "amount,desc"),
            ("unrelated", "x"),
        ];
        let params = PageParams::from_pairs(
            query.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        );
        assert_eq!(params.sort, vec!["owner,asc".to_string(), "amount,desc".to_string()]);
        assert_eq!(params.size.as_deref(), Some("5"));

        let req = PageRequest::from_params(&params, &cfg()).unwrap();
        assert_eq!(req.order_by_clause(), "owner ASC, amount DESC, id ASC");

        let mut cards = vec![
            CashCard { id: 1, amount: Decimal::new(100, 0), owner: "b".into() },
            CashCard { id: 2, amount: Decimal::new(50, 0), owner: "a".into() },
            CashCard { id: 3, amount: Decimal::new(300, 0), owner: "a".into() },
        ];
        let orders = req.effective_sort();
        cards.sort_by(|a, b| compare_cards(&orders, a, b));
        let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn unknown_property_in_any_sort_value_is_rejected() {
        let params = PageParams {
            sort: vec!["amount,desc".into(), "secret".into()],
            ..Default::default()
        };
        let err = PageRequest::from_params(&params, &cfg()).unwrap_err();
        assert_eq!(err, SortError::UnknownProperty("secret".into()));
    }
}
