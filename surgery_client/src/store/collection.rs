use crate::models::{Identified, ListPayload, Pagination};

/// List + selection state shared by the patients and appointments partitions.
#[derive(Clone, Debug)]
pub struct Collection<T> {
    items: Vec<T>,
    current: Option<T>,
    loading: bool,
    pagination: Pagination,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            loading: false,
            pagination: Pagination::default(),
        }
    }
}

impl<T: Identified> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Replaces the list. Envelopes also replace the pagination; a bare array
    /// leaves it as it was.
    pub fn set_list(&mut self, payload: ListPayload<T>) {
        let (items, pagination) = payload.into_parts();
        self.items = items;
        if let Some(pagination) = pagination {
            self.pagination = pagination;
        }
    }

    pub fn set_current(&mut self, item: Option<T>) {
        self.current = item;
    }

    /// Newly created records go to the front.
    pub fn add(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Returns false when no record with that id is loaded.
    pub fn replace_by_id(&mut self, item: T) -> bool {
        match self.items.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => false,
        }
    }

    pub fn remove_by_id(&mut self, id: i64) {
        self.items.retain(|item| item.id() != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Page, Patient};
    use crate::testing::sample_patient;

    fn ids(collection: &Collection<Patient>) -> Vec<i64> {
        collection.items().iter().map(|p| p.id).collect()
    }

    #[test]
    fn bare_and_paged_payloads_normalize_to_the_same_list() {
        let records = vec![sample_patient(1), sample_patient(2)];

        let mut from_bare = Collection::default();
        from_bare.set_list(ListPayload::Bare(records.clone()));

        let mut from_page = Collection::default();
        from_page.set_list(ListPayload::Paged(Page {
            content: records.clone(),
            number: 3,
            size: 2,
            total_elements: 8,
            total_pages: 4,
        }));

        assert_eq!(from_bare.items(), from_page.items());
        assert_eq!(from_bare.pagination(), Pagination::default());
        assert_eq!(
            from_page.pagination(),
            Pagination {
                page: 3,
                size: 2,
                total: 8
            }
        );
    }

    #[test]
    fn bare_payload_keeps_previous_pagination() {
        let mut collection = Collection::default();
        collection.set_list(ListPayload::Paged(Page::slice(
            vec![sample_patient(1), sample_patient(2), sample_patient(3)],
            0,
            2,
        )));
        collection.set_list(ListPayload::Bare(vec![sample_patient(7)]));

        assert_eq!(ids(&collection), vec![7]);
        assert_eq!(collection.pagination().total, 3);
    }

    #[test]
    fn add_replace_and_remove_by_id() {
        let mut collection = Collection::default();
        collection.set_list(ListPayload::Bare(vec![sample_patient(1), sample_patient(2)]));

        collection.add(sample_patient(3));
        assert_eq!(ids(&collection), vec![3, 1, 2]);

        let mut changed = sample_patient(1);
        changed.status = Some("SCHEDULED".into());
        assert!(collection.replace_by_id(changed));
        assert_eq!(collection.items()[1].status.as_deref(), Some("SCHEDULED"));

        assert!(!collection.replace_by_id(sample_patient(42)));
        assert_eq!(ids(&collection), vec![3, 1, 2]);

        collection.remove_by_id(1);
        collection.remove_by_id(99);
        assert_eq!(ids(&collection), vec![3, 2]);
    }
}
