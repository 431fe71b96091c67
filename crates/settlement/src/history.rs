//! Settlement history query building and pagination

use chrono::{DateTime, Duration, Utc};
use common::types::{Address, Identity};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettlementError};
use crate::types::SettlementHistoryQuery;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// Defaults and limits applied while parsing history parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySettings {
    pub window_days: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Raw history parameters exactly as received; empty values count as absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementHistoryParams {
    #[serde(default)]
    pub at_from: Option<String>,
    #[serde(default)]
    pub at_to: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub accountant_id: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub page_size: Option<String>,
}

/// Validated history request: store filter plus page window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub query: SettlementHistoryQuery,
    pub page: u32,
    pub page_size: u32,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_timestamp(name: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| SettlementError::invalid_parameter(name, format!("'{}': {}", raw, e)))
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(0) => Err(SettlementError::invalid_parameter(name, "must be a positive integer")),
        Ok(value) => Ok(value),
        Err(e) => Err(SettlementError::invalid_parameter(name, format!("'{}': {}", raw, e))),
    }
}

fn parse_address(name: &'static str, raw: &str) -> Result<Address> {
    Address::parse(raw).map_err(|e| SettlementError::invalid_parameter(name, e))
}

impl SettlementHistoryParams {
    /// Validate parameters in order, applying defaults relative to `now`
    pub fn parse(&self, now: DateTime<Utc>, settings: &HistorySettings) -> Result<HistoryRequest> {
        let from = match present(&self.at_from) {
            Some(raw) => parse_timestamp("at_from", raw)?,
            None => now
                .checked_sub_signed(Duration::days(i64::from(settings.window_days)))
                .ok_or_else(|| {
                    SettlementError::Internal(format!(
                        "history window of {} days is out of range",
                        settings.window_days
                    ))
                })?,
        };

        let to = match present(&self.at_to) {
            Some(raw) => parse_timestamp("at_to", raw)?,
            None => now,
        };

        let provider_id = present(&self.provider_id)
            .map(|raw| parse_address("provider_id", raw).map(Identity::from_address))
            .transpose()?;

        let accountant_id = present(&self.accountant_id)
            .map(|raw| parse_address("accountant_id", raw))
            .transpose()?;

        let page = present(&self.page)
            .map(|raw| parse_positive("page", raw))
            .transpose()?
            .unwrap_or(1);

        let page_size = present(&self.page_size)
            .map(|raw| parse_positive("page_size", raw))
            .transpose()?
            .unwrap_or(settings.default_page_size);

        if page_size > settings.max_page_size {
            return Err(SettlementError::invalid_parameter(
                "page_size",
                format!("must not exceed {}", settings.max_page_size),
            ));
        }

        if from > to {
            return Err(SettlementError::invalid_parameter(
                "at_from",
                "must not be later than at_to",
            ));
        }

        Ok(HistoryRequest {
            query: SettlementHistoryQuery {
                from,
                to,
                provider_id,
                accountant_id,
            },
            page,
            page_size,
        })
    }
}

/// Paging metadata returned alongside a page of items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub paging: PageInfo,
}

/// Slice one 1-based page out of an ordered result set
///
/// A page past the end yields no items but still reports the totals.
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: u32) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);

    let total_items = items.len() as u64;
    let total_pages = total_items.div_ceil(u64::from(page_size));

    let start = u64::from(page - 1) * u64::from(page_size);
    let items: Vec<T> = usize::try_from(start)
        .map(|start| {
            items
                .into_iter()
                .skip(start)
                .take(page_size as usize)
                .collect()
        })
        .unwrap_or_default();

    Page {
        items,
        paging: PageInfo {
            page,
            page_size,
            total_items,
            total_pages,
            previous_page: (page > 1).then(|| page - 1),
            next_page: (u64::from(page) < total_pages).then(|| page + 1),
        },
    }
}
