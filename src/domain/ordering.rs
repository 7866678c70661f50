//! Token ordering, filtering and paging

use std::cmp::Ordering;

use clap::ValueEnum;

use super::token::Token;

/// Number of pages a listing is split into
pub const PAGE_COUNT: usize = 4;

/// Canonical aggregation order: newest first, deeper liquidity breaks ties.
/// Unparseable timestamps sort as oldest.
pub fn compare_recency(a: &Token, b: &Token) -> Ordering {
    b.created_at_utc()
        .cmp(&a.created_at_utc())
        .then_with(|| b.liquidity.total_cmp(&a.liquidity))
}

/// Sort in place by [`compare_recency`]. Stable, so full ties keep feed order.
pub fn sort_by_recency(tokens: &mut [Token]) {
    tokens.sort_by(compare_recency);
}

/// Listing view orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortMode {
    /// Newest first
    #[default]
    Latest,
    /// Deepest liquidity first
    Trending,
    /// Most comments first
    Active,
    /// Oldest first
    Newborn,
}

impl SortMode {
    pub fn apply(&self, tokens: &mut [Token]) {
        match self {
            SortMode::Latest => tokens.sort_by(|a, b| b.created_at_utc().cmp(&a.created_at_utc())),
            SortMode::Trending => tokens.sort_by(|a, b| b.liquidity.total_cmp(&a.liquidity)),
            SortMode::Active => tokens.sort_by(|a, b| b.comment_count.cmp(&a.comment_count)),
            SortMode::Newborn => tokens.sort_by(|a, b| a.created_at_utc().cmp(&b.created_at_utc())),
        }
    }
}

/// Filter, sort and split a listing into [`PAGE_COUNT`] pages
pub fn arrange(tokens: &[Token], mode: SortMode, show_nsfw: bool) -> Vec<Vec<Token>> {
    let mut list: Vec<Token> = tokens
        .iter()
        .filter(|t| show_nsfw || !t.nsfw)
        .cloned()
        .collect();
    mode.apply(&mut list);
    paginate(list)
}

/// Split into [`PAGE_COUNT`] pages of `ceil(len / PAGE_COUNT)`; trailing pages may be empty
pub fn paginate(list: Vec<Token>) -> Vec<Vec<Token>> {
    let per_page = list.len().div_ceil(PAGE_COUNT).max(1);
    let mut pages: Vec<Vec<Token>> = list.chunks(per_page).map(|c| c.to_vec()).collect();
    pages.resize_with(PAGE_COUNT, Vec::new);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::PLACEHOLDER_IMAGE;

    fn token(id: &str, created_at: &str, liquidity: f64) -> Token {
        Token {
            name: id.to_string(),
            symbol: id.to_uppercase(),
            image: PLACEHOLDER_IMAGE.to_string(),
            identifier: id.to_string(),
            market_value: 0.0,
            price_usd: 0.0,
            liquidity,
            created_at: created_at.to_string(),
            description: String::new(),
            creator_display: String::new(),
            avatar: PLACEHOLDER_IMAGE.to_string(),
            change_percent: 0.0,
            comment_count: 0,
            nsfw: false,
            source: None,
        }
    }

    fn ids(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.identifier.as_str()).collect()
    }

    #[test]
    fn test_recency_with_liquidity_tiebreak() {
        let mut tokens = vec![
            token("a", "2024-01-01T00:00:00Z", 500.0),
            token("b", "2024-01-01T00:00:00Z", 900.0),
            token("c", "2024-03-01T00:00:00Z", 1.0),
            token("d", "garbage", 10_000.0),
        ];
        sort_by_recency(&mut tokens);
        assert_eq!(ids(&tokens), vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_mixed_offsets_compare_as_instants() {
        let mut tokens = vec![
            token("early", "2024-01-01T10:00:00+02:00", 0.0),
            token("late", "2024-01-01T09:00:00Z", 0.0),
        ];
        sort_by_recency(&mut tokens);
        assert_eq!(ids(&tokens), vec!["late", "early"]);
    }

    #[test]
    fn test_sort_modes() {
        let mut a = token("a", "2024-01-01T00:00:00Z", 10.0);
        a.comment_count = 5;
        let b = token("b", "2024-02-01T00:00:00Z", 30.0);
        let c = token("c", "2024-03-01T00:00:00Z", 20.0);
        let base = vec![a, b, c];

        let mut list = base.clone();
        SortMode::Latest.apply(&mut list);
        assert_eq!(ids(&list), vec!["c", "b", "a"]);

        let mut list = base.clone();
        SortMode::Trending.apply(&mut list);
        assert_eq!(ids(&list), vec!["b", "c", "a"]);

        let mut list = base.clone();
        SortMode::Active.apply(&mut list);
        assert_eq!(ids(&list)[0], "a");

        let mut list = base;
        SortMode::Newborn.apply(&mut list);
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_arrange_filters_nsfw_and_pages() {
        let mut tokens: Vec<Token> = (0..9)
            .map(|i| token(&format!("t{}", i), &format!("2024-01-0{}T00:00:00Z", i + 1), 0.0))
            .collect();
        tokens[0].nsfw = true;

        let pages = arrange(&tokens, SortMode::Latest, false);
        assert_eq!(pages.len(), PAGE_COUNT);
        assert_eq!(pages.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![2, 2, 2, 2]);
        assert_eq!(pages[0][0].identifier, "t8");

        let pages = arrange(&tokens, SortMode::Latest, true);
        assert_eq!(pages.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![3, 3, 3, 0]);
    }

    #[test]
    fn test_paginate_empty() {
        let pages = paginate(Vec::new());
        assert_eq!(pages.len(), PAGE_COUNT);
        assert!(pages.iter().all(|p| p.is_empty()));
    }
}
