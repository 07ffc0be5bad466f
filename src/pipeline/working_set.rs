//! The client-held collection of emails currently displayed. Kept as
//! an explicit state struct with pure update methods rather than
//! ambient globals.

use std::collections::HashSet;

use super::EmailRecord;

#[derive(Default)]
pub struct WorkingSet {
    emails: Vec<EmailRecord>,
}

impl WorkingSet {
    /// A fresh (non-load-more) scan invalidates the whole set
    pub fn reset(&mut self) {
        self.emails.clear();
    }

    /// Merge a fetched page into the set, dropping any record whose
    /// id is already present. Returns the records actually added, in
    /// their incoming order. An existing record keeps its verdict.
    pub fn merge(&mut self, incoming: Vec<EmailRecord>) -> Vec<EmailRecord> {
        let existing: HashSet<String> = self.emails.iter().map(|e| e.id.clone()).collect();
        let mut added = Vec::new();
        let mut seen = existing;
        for email in incoming {
            if seen.insert(email.id.clone()) {
                self.emails.push(email.clone());
                added.push(email);
            }
        }
        added
    }

    /// Remove trashed records entirely. No tombstones.
    pub fn remove(&mut self, ids: &[String]) -> usize {
        let doomed: HashSet<&String> = ids.iter().collect();
        let before = self.emails.len();
        self.emails.retain(|email| !doomed.contains(&email.id));
        before - self.emails.len()
    }

    /// Flip the read flag. Returns false when the id is unknown.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.emails.iter_mut().find(|email| email.id == id) {
            Some(email) => {
                email.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn emails(&self) -> &[EmailRecord] {
        &self.emails
    }
}
