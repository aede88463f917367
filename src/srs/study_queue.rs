//! Working set for one study run.
//!
//! Items are shown in order. Missed items are collected and, once the
//! queue is exhausted, replayed as another pass until every item has been
//! answered positively. A bounded history lets the presentation layer step
//! back to the previous card.

use std::collections::VecDeque;

use crate::config;
use crate::domain::VocabularyItem;

/// Where the current card is in its flip-and-answer cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
  /// Prompt side shown
  AwaitingReveal,
  /// Answer side shown, waiting for know / don't know
  Revealed,
  /// Answer accepted, persistence in flight
  Submitting,
  /// Queue and retry list both exhausted
  Completed,
}

/// Snapshot kept for "previous card"
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
  pub index: usize,
  pub item: VocabularyItem,
}

#[derive(Debug, Clone)]
pub struct StudyRun {
  items: Vec<VocabularyItem>,
  index: usize,
  /// Items missed during the current pass (each at most once)
  retry: Vec<VocabularyItem>,
  history: VecDeque<HistoryEntry>,
  history_limit: usize,
  phase: CardPhase,
  is_new: bool,
  pass: u32,
}

impl StudyRun {
  pub fn new(items: Vec<VocabularyItem>, is_new: bool) -> Self {
    Self::with_history_limit(items, is_new, config::HISTORY_LIMIT)
  }

  pub fn with_history_limit(items: Vec<VocabularyItem>, is_new: bool, history_limit: usize) -> Self {
    let phase = if items.is_empty() {
      CardPhase::Completed
    } else {
      CardPhase::AwaitingReveal
    };
    Self {
      items,
      index: 0,
      retry: Vec::new(),
      history: VecDeque::new(),
      history_limit,
      phase,
      is_new,
      pass: 1,
    }
  }

  pub fn current(&self) -> Option<&VocabularyItem> {
    match self.phase {
      CardPhase::Completed => None,
      _ => self.items.get(self.index),
    }
  }

  pub fn phase(&self) -> CardPhase {
    self.phase
  }

  pub fn is_complete(&self) -> bool {
    self.phase == CardPhase::Completed
  }

  /// Whether answers in this run count as new words
  pub fn is_new(&self) -> bool {
    self.is_new
  }

  /// 1-based pass number; increases each time missed items are replayed
  pub fn pass(&self) -> u32 {
    self.pass
  }

  /// (1-based position, queue length) for progress display
  pub fn position(&self) -> (usize, usize) {
    ((self.index + 1).min(self.items.len()), self.items.len())
  }

  pub fn retry_len(&self) -> usize {
    self.retry.len()
  }

  pub fn history_len(&self) -> usize {
    self.history.len()
  }

  /// Show the answer side. Returns false outside `AwaitingReveal`.
  pub fn reveal(&mut self) -> bool {
    if self.phase != CardPhase::AwaitingReveal {
      return false;
    }
    self.phase = CardPhase::Revealed;
    true
  }

  /// Lock the current card for submission. Only one submit per reveal is
  /// accepted, so a second call returns None until the card advances.
  pub fn begin_submit(&mut self) -> Option<VocabularyItem> {
    if self.phase != CardPhase::Revealed {
      return None;
    }
    let item = self.items.get(self.index)?.clone();
    self.phase = CardPhase::Submitting;
    Some(item)
  }

  /// Submission failed; the card can be answered again
  pub fn abort_submit(&mut self) {
    if self.phase == CardPhase::Submitting {
      self.phase = CardPhase::Revealed;
    }
  }

  /// Record the answer and move to the next card
  pub fn finish_submit(&mut self, know: bool) {
    if self.phase != CardPhase::Submitting {
      return;
    }
    let item = self.items[self.index].clone();

    if !know && !self.retry.iter().any(|r| r.id == item.id) {
      self.retry.push(item.clone());
    }

    self.history.push_back(HistoryEntry {
      index: self.index,
      item,
    });
    while self.history.len() > self.history_limit {
      self.history.pop_front();
    }

    self.advance();
  }

  /// Step back to the previously answered card of this pass
  pub fn go_previous(&mut self) -> Option<&VocabularyItem> {
    if self.phase == CardPhase::Submitting {
      return None;
    }
    let entry = self.history.pop_back()?;
    self.index = entry.index;
    self.phase = CardPhase::AwaitingReveal;
    self.items.get(self.index)
  }

  fn advance(&mut self) {
    self.index += 1;
    if self.index < self.items.len() {
      self.phase = CardPhase::AwaitingReveal;
      return;
    }

    if self.retry.is_empty() {
      self.phase = CardPhase::Completed;
      return;
    }

    tracing::debug!("Replaying {} missed items", self.retry.len());
    self.items = std::mem::take(&mut self.retry);
    self.index = 0;
    self.pass += 1;
    // Indexes in the history refer to the previous pass
    self.history.clear();
    self.phase = CardPhase::AwaitingReveal;
  }
}
