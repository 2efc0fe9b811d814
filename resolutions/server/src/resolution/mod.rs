use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Resolution {
    id: u32,
    title: String,
    is_done: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Resolution {
    pub fn new(
        id: u32,
        title: String,
        is_done: bool,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            title,
            is_done,
            created_at,
            updated_at,
        }
    }

    /// Returns the ID of the resolution.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the resolution has been completed.
    pub fn is_done(&self) -> bool {
        self.is_done
    }

    /// Returns when the resolution was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the resolution was last updated, if it ever was.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn matches(&self, filter: &ResolutionFilter) -> bool {
        if let Some(is_done) = filter.is_done {
            if self.is_done != is_done {
                return false;
            }
        }
        match filter.title_contains.as_deref() {
            Some(needle) if !needle.trim().is_empty() => self
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

/// Source of the current time for stamping resolutions.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Filters applied when listing resolutions. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionFilter {
    pub is_done: Option<bool>,
    pub title_contains: Option<String>,
}

/// Error type for ResolutionService operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionServiceError {
    /// The title was empty or only whitespace.
    #[error("title is required")]
    BlankTitle,
    /// No resolution exists with the given ID.
    #[error("resolution with id {0} not found")]
    NotFound(u32),
}

/// In-memory store of resolutions. IDs start at 1 and are never reused.
pub struct ResolutionService {
    resolutions: Vec<Resolution>,
    next_id: u32,
    clock: Arc<dyn Clock>,
}

impl Default for ResolutionService {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionService {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            resolutions: Vec::new(),
            next_id: 1,
            clock,
        }
    }

    /// Lists resolutions matching the filter, in insertion order.
    ///
    /// The title filter is a case-insensitive substring match and is ignored
    /// when blank.
    #[tracing::instrument(skip(self))]
    pub fn list(&self, filter: &ResolutionFilter) -> Vec<Resolution> {
        self.resolutions
            .iter()
            .filter(|resolution| resolution.matches(filter))
            .cloned()
            .collect()
    }

    /// Retrieves a resolution by its ID.
    #[tracing::instrument(skip(self))]
    pub fn get_by_id(&self, id: u32) -> Result<Resolution, ResolutionServiceError> {
        self.resolutions
            .iter()
            .find(|resolution| resolution.id == id)
            .cloned()
            .ok_or(ResolutionServiceError::NotFound(id))
    }

    /// Creates a new, not yet done resolution.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the resolution. Must not be blank.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Resolution`, or `BlankTitle`.
    #[tracing::instrument(skip(self))]
    pub fn create(&mut self, title: String) -> Result<Resolution, ResolutionServiceError> {
        if title.trim().is_empty() {
            return Err(ResolutionServiceError::BlankTitle);
        }

        let resolution = Resolution::new(self.next_id, title, false, self.clock.now(), None);
        self.next_id += 1;
        self.resolutions.push(resolution.clone());
        tracing::info!("Created resolution {}", resolution.id);
        Ok(resolution)
    }

    /// Replaces the title and done flag of a resolution and stamps `updated_at`.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the resolution to update.
    /// * `title` - The new title. Must not be blank.
    /// * `is_done` - The new done flag.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Resolution`, or `BlankTitle` / `NotFound`.
    #[tracing::instrument(skip(self))]
    pub fn update(
        &mut self,
        id: u32,
        title: String,
        is_done: bool,
    ) -> Result<Resolution, ResolutionServiceError> {
        if title.trim().is_empty() {
            return Err(ResolutionServiceError::BlankTitle);
        }

        let resolution = self
            .resolutions
            .iter_mut()
            .find(|resolution| resolution.id == id)
            .ok_or(ResolutionServiceError::NotFound(id))?;

        resolution.title = title;
        resolution.is_done = is_done;
        resolution.updated_at = Some(self.clock.now());
        Ok(resolution.clone())
    }

    /// Deletes a resolution by its ID.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: u32) -> Result<(), ResolutionServiceError> {
        let position = self
            .resolutions
            .iter()
            .position(|resolution| resolution.id == id)
            .ok_or(ResolutionServiceError::NotFound(id))?;

        self.resolutions.remove(position);
        tracing::info!("Deleted resolution {}", id);
        Ok(())
    }
}

/// Shared router state wrapping the service.
///
/// Reads take the read lock, mutations the write lock.
#[derive(Default)]
pub struct ResolutionState {
    pub service: RwLock<ResolutionService>,
}

impl ResolutionState {
    pub fn new(service: ResolutionService) -> Self {
        Self {
            service: RwLock::new(service),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap()
    }

    fn service_with_times(times: Vec<DateTime<Utc>>) -> ResolutionService {
        let mut clock = MockClock::new();
        let mut times = times.into_iter();
        clock
            .expect_now()
            .returning(move || times.next().expect("clock called too often"));
        ResolutionService::with_clock(Arc::new(clock))
    }

    #[test]
    fn can_create_resolution_with_clock_timestamp() {
        let mut service = service_with_times(vec![fixed_time(9)]);

        let created = service.create("Learn Rust".to_string()).unwrap();

        assert_eq!(
            created,
            Resolution::new(1, "Learn Rust".to_string(), false, fixed_time(9), None)
        );
    }

    #[test]
    fn cannot_create_resolution_with_blank_title() {
        let mut clock = MockClock::new();
        clock.expect_now().never();
        let mut service = ResolutionService::with_clock(Arc::new(clock));

        assert_eq!(
            service.create("   ".to_string()),
            Err(ResolutionServiceError::BlankTitle)
        );
        assert!(service.list(&ResolutionFilter::default()).is_empty());
    }

    #[test]
    fn update_stamps_updated_at_and_keeps_created_at() {
        let mut service = service_with_times(vec![fixed_time(9), fixed_time(10)]);
        let created = service.create("Read more".to_string()).unwrap();

        let updated = service
            .update(created.id(), "Read more books".to_string(), true)
            .unwrap();

        assert_eq!(updated.title(), "Read more books");
        assert!(updated.is_done());
        assert_eq!(updated.created_at(), fixed_time(9));
        assert_eq!(updated.updated_at(), Some(fixed_time(10)));
        assert_eq!(service.get_by_id(created.id()), Ok(updated));
    }

    #[test]
    fn update_checks_title_before_lookup() {
        let mut service = service_with_times(vec![]);

        assert_eq!(
            service.update(42, "".to_string(), true),
            Err(ResolutionServiceError::BlankTitle)
        );
        assert_eq!(
            service.update(42, "Run".to_string(), true),
            Err(ResolutionServiceError::NotFound(42))
        );
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut service = service_with_times(vec![fixed_time(1), fixed_time(2), fixed_time(3)]);
        let first = service.create("One".to_string()).unwrap();
        let second = service.create("Two".to_string()).unwrap();
        service.delete(second.id()).unwrap();

        let third = service.create("Three".to_string()).unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(third.id(), 3);
    }

    #[test]
    fn deleting_missing_resolution_reports_not_found() {
        let mut service = service_with_times(vec![fixed_time(1)]);
        let created = service.create("Once".to_string()).unwrap();
        service.delete(created.id()).unwrap();

        assert_eq!(
            service.delete(created.id()),
            Err(ResolutionServiceError::NotFound(created.id()))
        );
        assert_eq!(
            service.get_by_id(created.id()),
            Err(ResolutionServiceError::NotFound(created.id()))
        );
    }

    #[test]
    fn list_applies_both_filters_in_insertion_order() {
        let mut service = service_with_times(vec![fixed_time(1); 5]);
        service.create("Learn Go".to_string()).unwrap();
        service.create("Learn Rust".to_string()).unwrap();
        service.create("Go running".to_string()).unwrap();
        service.create("Cook".to_string()).unwrap();
        service.update(3, "Go running".to_string(), true).unwrap();

        let go = service.list(&ResolutionFilter {
            is_done: None,
            title_contains: Some("GO".to_string()),
        });
        let go_ids: Vec<u32> = go.iter().map(Resolution::id).collect();
        assert_eq!(go_ids, vec![1, 3]);

        let done_go = service.list(&ResolutionFilter {
            is_done: Some(true),
            title_contains: Some("go".to_string()),
        });
        let done_go_ids: Vec<u32> = done_go.iter().map(Resolution::id).collect();
        assert_eq!(done_go_ids, vec![3]);

        let blank_title = service.list(&ResolutionFilter {
            is_done: Some(false),
            title_contains: Some("  ".to_string()),
        });
        let blank_title_ids: Vec<u32> = blank_title.iter().map(Resolution::id).collect();
        assert_eq!(blank_title_ids, vec![1, 2, 4]);
    }
}
