use crate::config::AppConfig;

/// Splits an ordered sequence into fixed-size, 1-based pages.
///
/// The paginator owns a snapshot of the items: when the sequence changes
/// (filter, sort or refresh) build a new one, which starts at page 1.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    current_page: usize,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_page_size(items, AppConfig::ITEMS_PER_PAGE)
    }

    pub fn with_page_size(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Opens on `page_number`, or on the first page when it is out of range.
    pub fn starting_at(mut self, page_number: usize) -> Self {
        self.go_to(page_number);
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items of page `page_number`, empty when it is out of range.
    pub fn page(&self, page_number: usize) -> &[T] {
        if page_number == 0 {
            return &[];
        }
        let start = (page_number - 1).saturating_mul(self.page_size);
        if start >= self.items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    pub fn current(&self) -> &[T] {
        self.page(self.current_page)
    }

    /// 0-based index of the first item of the current page.
    pub fn start_index(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current_page += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    pub fn go_to(&mut self, page_number: usize) -> bool {
        if page_number == 0 || page_number > self.total_pages() {
            return false;
        }
        self.current_page = page_number;
        true
    }

    /// e.g. `Page 2 of 3 | Showing 21-40 of 45`.
    pub fn range_description(&self) -> String {
        let total = self.items.len();
        let (first, last) = if total == 0 {
            (0, 0)
        } else {
            let first = self.start_index() + 1;
            (first, first + self.current().len() - 1)
        };
        format!(
            "Page {} of {} | Showing {}-{} of {}",
            self.current_page,
            self.total_pages(),
            first,
            last,
            total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_45_items_make_3_pages() {
        let paginator = Paginator::new((1..=45).collect::<Vec<u32>>());
        assert_eq!(paginator.total_pages(), 3);
        assert_eq!(paginator.page(1).len(), 20);
        assert_eq!(paginator.page(3), &[41, 42, 43, 44, 45]);
        assert!(paginator.page(4).is_empty());
        assert!(paginator.page(0).is_empty());
    }

    #[test]
    fn test_pages_partition_the_items() {
        for (len, size) in [(0, 20), (1, 20), (20, 20), (21, 20), (99, 7), (100, 10)] {
            let items: Vec<usize> = (0..len).collect();
            let paginator = Paginator::with_page_size(items.clone(), size);
            let joined: Vec<usize> = (1..=paginator.total_pages())
                .flat_map(|page| paginator.page(page).to_vec())
                .collect();
            assert_eq!(joined, items, "len {len} size {size}");
        }
    }

    #[test]
    fn test_empty_sequence_has_one_empty_page() {
        let paginator = Paginator::<u32>::new(vec![]);
        assert_eq!(paginator.total_pages(), 1);
        assert!(paginator.current().is_empty());
        assert_eq!(paginator.range_description(), "Page 1 of 1 | Showing 0-0 of 0");
    }

    #[test]
    fn test_navigation_stays_in_range() {
        let mut paginator = Paginator::with_page_size((1..=45).collect::<Vec<u32>>(), 20);
        assert!(!paginator.previous());
        assert!(paginator.next());
        assert_eq!(paginator.range_description(), "Page 2 of 3 | Showing 21-40 of 45");
        assert!(paginator.next());
        assert!(!paginator.next());
        assert_eq!(paginator.range_description(), "Page 3 of 3 | Showing 41-45 of 45");
        assert!(!paginator.go_to(4));
        assert!(paginator.go_to(1));
        assert_eq!(paginator.start_index(), 0);
    }

    #[test]
    fn test_rebuilt_list_reopens_on_the_same_page() {
        let mut paginator = Paginator::with_page_size((1..=45).collect::<Vec<u32>>(), 20);
        paginator.next();
        let page = paginator.current_page();

        let reopened =
            Paginator::with_page_size((1..=45).collect::<Vec<u32>>(), 20).starting_at(page);
        assert_eq!(reopened.current_page(), 2);
        assert_eq!(reopened.start_index(), 20);

        let shrunk =
            Paginator::with_page_size((1..=10).collect::<Vec<u32>>(), 20).starting_at(page);
        assert_eq!(shrunk.current_page(), 1);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let paginator = Paginator::with_page_size(vec!['a', 'b'], 0);
        assert_eq!(paginator.total_pages(), 2);
        assert_eq!(paginator.page(2), &['b']);
    }
}
