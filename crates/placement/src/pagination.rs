//! Client-side paging for the dashboard tables.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::workflows::directory::{Role, UnknownVariant};

/// Fixed-size pager. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A zero size is treated as one row per page.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Buttons to render under a table; none for an empty list.
    pub fn page_numbers(&self, total: usize) -> Vec<usize> {
        (1..=self.page_count(total)).collect()
    }

    /// Pull a requested page back into range after the list shrank or grew.
    pub fn clamp(&self, page: usize, total: usize) -> usize {
        page.clamp(1, self.page_count(total).max(1))
    }

    pub fn page<'a, T>(&self, items: &'a [T], page: usize) -> Page<'a, T> {
        let number = self.clamp(page, items.len());
        let start = (number - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        Page {
            items: items.get(start..end).unwrap_or_default(),
            number,
            count: self.page_count(items.len()),
            total: items.len(),
            offset: start,
        }
    }
}

/// One visible slice of a list.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub number: usize,
    pub count: usize,
    pub total: usize,
    /// Index of the first visible item in the full list.
    pub offset: usize,
}

impl<T> Page<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    Accounts,
    Companies,
    Students,
    Positions,
    Applications,
    Interviews,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 6] = [
        DashboardTab::Accounts,
        DashboardTab::Companies,
        DashboardTab::Students,
        DashboardTab::Positions,
        DashboardTab::Applications,
        DashboardTab::Interviews,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DashboardTab::Accounts => "accounts",
            DashboardTab::Companies => "companies",
            DashboardTab::Students => "students",
            DashboardTab::Positions => "positions",
            DashboardTab::Applications => "applications",
            DashboardTab::Interviews => "interviews",
        }
    }

    /// Tabs on each role's dashboard, in display order.
    pub fn for_role(role: Role) -> &'static [DashboardTab] {
        match role {
            Role::Admin => &[
                DashboardTab::Accounts,
                DashboardTab::Companies,
                DashboardTab::Students,
                DashboardTab::Positions,
            ],
            Role::Company => &[DashboardTab::Applications, DashboardTab::Interviews],
            Role::Student => &[DashboardTab::Positions, DashboardTab::Applications],
        }
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DashboardTab {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        DashboardTab::ALL
            .into_iter()
            .find(|tab| tab.label() == normalized)
            .ok_or_else(|| UnknownVariant::new("dashboard tab", value))
    }
}

/// Current page per tab; tabs page independently.
#[derive(Debug, Clone, Default)]
pub struct DashboardPages {
    paginator: Paginator,
    current: BTreeMap<DashboardTab, usize>,
}

impl DashboardPages {
    pub fn new(paginator: Paginator) -> Self {
        Self {
            paginator,
            current: BTreeMap::new(),
        }
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub fn current(&self, tab: DashboardTab) -> usize {
        self.current.get(&tab).copied().unwrap_or(1)
    }

    pub fn go_to(&mut self, tab: DashboardTab, page: usize) {
        self.current.insert(tab, page.max(1));
    }

    /// Slice the tab's list at its current page, clamping the stored page if the list shrank.
    pub fn view<'a, T>(&mut self, tab: DashboardTab, items: &'a [T]) -> Page<'a, T> {
        let page = self.paginator.page(items, self.current(tab));
        self.current.insert(tab, page.number);
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_no_pages() {
        let paginator = Paginator::new(5);
        assert_eq!(paginator.page_count(0), 0);
        assert!(paginator.page_numbers(0).is_empty());

        let page = paginator.page::<u32>(&[], 3);
        assert!(page.is_empty());
        assert_eq!(page.number, 1);
        assert_eq!(page.count, 0);
    }

    #[test]
    fn exact_multiple_fills_pages() {
        let paginator = Paginator::new(5);
        assert_eq!(paginator.page_count(5), 1);
        assert_eq!(paginator.page_count(6), 2);
        assert_eq!(paginator.page_numbers(11), vec![1, 2, 3]);
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let rows: Vec<u32> = (1..=12).collect();
        let page = Paginator::new(5).page(&rows, 3);
        assert_eq!(page.items, &[11, 12]);
        assert_eq!(page.offset, 10);
        assert_eq!(page.count, 3);
        assert_eq!(page.total, 12);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let rows: Vec<u32> = (1..=7).collect();
        let paginator = Paginator::new(5);
        assert_eq!(paginator.page(&rows, 9).number, 2);
        assert_eq!(paginator.page(&rows, 0).number, 1);
    }

    #[test]
    fn zero_page_size_is_bumped_to_one() {
        assert_eq!(Paginator::new(0).page_size(), 1);
    }

    #[test]
    fn tabs_page_independently_and_clamp_on_shrink() {
        let mut pages = DashboardPages::new(Paginator::new(2));
        let applications: Vec<u32> = (1..=6).collect();
        let positions: Vec<u32> = (1..=3).collect();

        pages.go_to(DashboardTab::Applications, 3);
        assert_eq!(
            pages.view(DashboardTab::Applications, &applications).items,
            &[5, 6]
        );
        assert_eq!(pages.view(DashboardTab::Positions, &positions).number, 1);

        let shrunk = &applications[..3];
        let page = pages.view(DashboardTab::Applications, shrunk);
        assert_eq!(page.number, 2);
        assert_eq!(page.items, &[3]);
        assert_eq!(pages.current(DashboardTab::Applications), 2);
    }

    #[test]
    fn tab_names_parse_loosely() {
        assert_eq!(
            " Interviews ".parse::<DashboardTab>().expect("known tab"),
            DashboardTab::Interviews
        );
        assert!("payroll".parse::<DashboardTab>().is_err());
    }

    #[test]
    fn every_role_gets_a_tab_set() {
        assert!(DashboardTab::for_role(Role::Company).contains(&DashboardTab::Interviews));
        assert!(DashboardTab::for_role(Role::Student).contains(&DashboardTab::Positions));
        assert!(!DashboardTab::for_role(Role::Student).contains(&DashboardTab::Accounts));
    }
}
