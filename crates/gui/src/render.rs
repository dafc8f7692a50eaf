#![forbid(unsafe_code)]

//! Keyed card reconciliation, independent of egui.
//!
//! Cards are keyed by queue url. A reconcile pass removes cards whose url left
//! the filtered list, patches surviving cards in place and creates cards for
//! new urls. Card ids are stable for as long as a url stays visible.

use std::collections::{HashMap, HashSet};

use qdeck_core::format::{retention_text, updated_text, visibility_timeout_text};
use qdeck_core::Queue;
use smallvec::SmallVec;

pub type CardId = u64;

/// Everything a card displays, derived from one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub name: String,
    pub url: String,
    pub visible: u64,
    pub hidden: u64,
    pub delayed: u64,
    pub total: u64,
    pub purge_disabled: bool,
    pub visibility_timeout: String,
    pub retention: String,
    pub updated_text: String,
    pub error: Option<String>,
}

impl CardView {
    pub fn from_queue(q: &Queue) -> Self {
        let m = q.metrics();
        Self {
            name: q.name.clone(),
            url: q.url.clone(),
            visible: m.visible,
            hidden: m.hidden,
            delayed: m.delayed,
            total: m.total(),
            purge_disabled: m.total() == 0,
            visibility_timeout: visibility_timeout_text(q),
            retention: retention_text(q),
            updated_text: updated_text(q.last_updated),
            error: q.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Purge,
    Delete,
}

/// A click routed through a card's bound handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardIntent {
    pub action: CardAction,
    pub queue_url: String,
}

#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    pub view: CardView,
    bound: bool,
    handlers: SmallVec<[CardAction; 2]>,
}

impl Card {
    fn new(id: CardId, view: CardView) -> Self {
        Self { id, view, bound: false, handlers: SmallVec::new() }
    }

    /// Attach the purge/delete handlers. No-op once bound.
    fn bind(&mut self) {
        if self.bound {
            return;
        }
        self.handlers.push(CardAction::Purge);
        self.handlers.push(CardAction::Delete);
        self.bound = true;
    }

    pub fn is_bound(&self) -> bool { self.bound }

    pub fn handler_count(&self) -> usize { self.handlers.len() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The region has no queues at all.
    NoQueues,
    /// Queues exist but none pass the filter.
    NoMatches,
}

impl EmptyState {
    pub fn title(&self) -> &'static str { "No queues found" }

    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoQueues => "No SQS queues available in LocalStack",
            EmptyState::NoMatches => "No queues match your search criteria",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardArea {
    Cards,
    Empty(EmptyState),
}

/// What one reconcile pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub created: usize,
    pub patched: usize,
    pub removed: usize,
    pub unchanged: usize,
}

pub struct CardRegistry {
    cards: HashMap<String, Card>,
    order: Vec<String>,
    next_id: CardId,
    area: CardArea,
}

impl Default for CardRegistry {
    fn default() -> Self { Self::new() }
}

impl CardRegistry {
    pub fn new() -> Self {
        Self { cards: HashMap::new(), order: Vec::new(), next_id: 1, area: CardArea::Empty(EmptyState::NoQueues) }
    }

    pub fn reconcile(&mut self, filtered: &[Queue], total_queues: usize) -> RenderReport {
        let mut report = RenderReport::default();
        if filtered.is_empty() {
            report.removed = self.cards.len();
            self.cards.clear();
            self.order.clear();
            self.area = CardArea::Empty(if total_queues == 0 { EmptyState::NoQueues } else { EmptyState::NoMatches });
            return report;
        }
        self.area = CardArea::Cards;

        let keep: HashSet<&str> = filtered.iter().map(|q| q.url.as_str()).collect();
        let before = self.cards.len();
        self.cards.retain(|url, _| keep.contains(url.as_str()));
        report.removed = before - self.cards.len();

        let mut order = Vec::with_capacity(filtered.len());
        for q in filtered {
            if order.contains(&q.url) {
                continue;
            }
            let view = CardView::from_queue(q);
            match self.cards.get_mut(&q.url) {
                Some(card) => {
                    if card.view != view {
                        card.view = view;
                        report.patched += 1;
                    } else {
                        report.unchanged += 1;
                    }
                    card.bind();
                }
                None => {
                    let mut card = Card::new(self.next_id, view);
                    self.next_id += 1;
                    card.bind();
                    self.cards.insert(q.url.clone(), card);
                    report.created += 1;
                }
            }
            order.push(q.url.clone());
        }
        self.order = order;
        report
    }

    pub fn area(&self) -> CardArea { self.area }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn get(&self, url: &str) -> Option<&Card> { self.cards.get(url) }

    /// Cards in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> + '_ {
        self.order.iter().filter_map(move |u| self.cards.get(u))
    }

    /// Dispatch a click through the card's bound handlers.
    pub fn click(&self, url: &str, action: CardAction) -> Vec<CardIntent> {
        let Some(card) = self.cards.get(url) else { return Vec::new() };
        if action == CardAction::Purge && card.view.purge_disabled {
            return Vec::new();
        }
        card.handlers
            .iter()
            .filter(|h| **h == action)
            .map(|h| CardIntent { action: *h, queue_url: url.to_string() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use qdeck_core::{ATTR_HIDDEN, ATTR_VISIBLE};
    use std::collections::BTreeMap;

    fn q(name: &str, visible: u64) -> Queue {
        let mut a = BTreeMap::new();
        a.insert(ATTR_VISIBLE.to_string(), visible.to_string());
        a.insert(ATTR_HIDDEN.to_string(), "0".to_string());
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Queue::new(format!("http://localhost:4566/000000000000/{}", name), a, ts)
    }

    fn ids(r: &CardRegistry) -> Vec<CardId> { r.iter().map(|c| c.id).collect() }

    #[test]
    fn patching_one_card_keeps_the_others() {
        let mut r = CardRegistry::new();
        let first = r.reconcile(&[q("a", 1), q("b", 2), q("c", 3)], 3);
        assert_eq!(first.created, 3);
        let before = ids(&r);

        let rep = r.reconcile(&[q("a", 1), q("b", 7), q("c", 3)], 3);
        assert_eq!(rep, RenderReport { created: 0, patched: 1, removed: 0, unchanged: 2 });
        assert_eq!(ids(&r), before);
        assert_eq!(r.get(&q("b", 0).url).map(|c| c.view.visible), Some(7));
    }

    #[test]
    fn removed_and_added_keys() {
        let mut r = CardRegistry::new();
        r.reconcile(&[q("a", 1), q("b", 2)], 2);
        let a_id = r.get(&q("a", 0).url).map(|c| c.id);
        let rep = r.reconcile(&[q("a", 1), q("c", 5)], 2);
        assert_eq!((rep.created, rep.removed, rep.unchanged), (1, 1, 1));
        assert_eq!(r.get(&q("a", 0).url).map(|c| c.id), a_id);
        assert!(r.get(&q("b", 0).url).is_none());
    }

    #[test]
    fn reordering_moves_without_recreating() {
        let mut r = CardRegistry::new();
        r.reconcile(&[q("a", 1), q("b", 2)], 2);
        let (a, b) = (r.get(&q("a", 0).url).unwrap().id, r.get(&q("b", 0).url).unwrap().id);
        let rep = r.reconcile(&[q("b", 2), q("a", 1)], 2);
        assert_eq!(rep.created, 0);
        assert_eq!(ids(&r), vec![b, a]);
    }

    #[test]
    fn rebinding_does_not_double_handlers() {
        let mut r = CardRegistry::new();
        let list = [q("a", 4)];
        r.reconcile(&list, 1);
        r.reconcile(&list, 1);
        r.reconcile(&[q("a", 9)], 1);
        let card = r.get(&list[0].url).unwrap();
        assert!(card.is_bound());
        assert_eq!(card.handler_count(), 2);
        assert_eq!(r.click(&list[0].url, CardAction::Purge).len(), 1);
        assert_eq!(r.click(&list[0].url, CardAction::Delete).len(), 1);
    }

    #[test]
    fn purge_disabled_iff_total_zero() {
        let mut r = CardRegistry::new();
        r.reconcile(&[q("empty", 0), q("full", 2)], 2);
        let empty = r.get(&q("empty", 0).url).unwrap();
        assert!(empty.view.purge_disabled);
        assert!(r.click(&empty.view.url, CardAction::Purge).is_empty());
        assert_eq!(r.click(&empty.view.url, CardAction::Delete).len(), 1);
        assert!(!r.get(&q("full", 0).url).unwrap().view.purge_disabled);
    }

    #[test]
    fn empty_state_distinguishes_no_queues_from_no_matches() {
        let mut r = CardRegistry::new();
        r.reconcile(&[q("a", 1)], 1);
        let rep = r.reconcile(&[], 1);
        assert_eq!(rep.removed, 1);
        assert_eq!(r.area(), CardArea::Empty(EmptyState::NoMatches));
        r.reconcile(&[], 0);
        assert_eq!(r.area(), CardArea::Empty(EmptyState::NoQueues));
        assert_eq!(EmptyState::NoQueues.message(), "No SQS queues available in LocalStack");
        r.reconcile(&[q("a", 1)], 1);
        assert_eq!(r.area(), CardArea::Cards);
    }

    #[test]
    fn error_block_and_meta_follow_the_queue() {
        let mut r = CardRegistry::new();
        let broken = Queue::with_error("http://h/1/broken", "AccessDenied", Utc::now());
        r.reconcile(&[broken.clone()], 1);
        let c = r.get(&broken.url).unwrap();
        assert_eq!(c.view.error.as_deref(), Some("AccessDenied"));
        assert_eq!(c.view.visibility_timeout, "N/A");
        assert_eq!(c.view.retention, "N/A");
    }
}
