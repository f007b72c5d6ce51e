use fingerhash_minutiae::Template;

use crate::config::{DatabaseConfig, MatchConfig};
use crate::enroll;
use crate::error::{IndexError, Result};
use crate::hash::GroupSpace;
use crate::identify::{self, Match};
use crate::reference::MinutiaRef;
use crate::store::BucketStore;

/// Live state of an initialized context.
#[derive(Debug, Clone)]
struct Database {
    config: DatabaseConfig,
    space: GroupSpace,
    store: BucketStore,
    matching: MatchConfig,
    next_template_id: u32,
    templates_counter: u32,
}

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Uninitialized,
    Initialized(Box<Database>),
}

/// An identification database: the bucket index plus match settings.
///
/// A context starts uninitialized ([`Context::new`]); [`Context::create`]
/// allocates the index and [`Context::destroy`] releases it. Every other
/// operation returns [`IndexError::NotInitialized`] on an uninitialized
/// context.
///
/// Mutation takes `&mut self` and identification takes `&self`, so sharing a
/// context between threads is a matter of wrapping it in a lock.
///
/// # Example
///
/// ```
/// use fingerhash_index::{Context, DatabaseConfig};
/// use fingerhash_minutiae::Template;
///
/// let mut ctx = Context::with_config(Some(DatabaseConfig::default())).unwrap();
/// let tpl = Template::from_xyt("10 10 0\n40 10 90\n10 40 180\n", 64, 2).unwrap();
///
/// let id = ctx.add_template(&tpl).unwrap();
/// ctx.set_match_thresholds(2, 1, 0).unwrap();
/// assert_eq!(ctx.identify_best(&tpl).unwrap().map(|m| m.template_id), Some(id));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    state: State,
}

impl Context {
    /// Returns an uninitialized context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and initializes a context in one step.
    pub fn with_config(config: Option<DatabaseConfig>) -> Result<Self> {
        let mut ctx = Self::new();
        ctx.create(config)?;
        Ok(ctx)
    }

    /// Initializes the context with `config`, or the default layout.
    ///
    /// Fails with `AlreadyInitialized` on a live context and with
    /// `InvalidConfiguration` if `config` is invalid.
    pub fn create(&mut self, config: Option<DatabaseConfig>) -> Result<()> {
        if self.is_initialized() {
            return Err(IndexError::AlreadyInitialized);
        }
        let config = config.unwrap_or_default();
        let space = GroupSpace::new(&config)?;
        let store = BucketStore::new(space.bucket_count(), config.alloc_step as usize);

        tracing::debug!(
            buckets = space.bucket_count(),
            max_x = config.max_x,
            max_y = config.max_y,
            pixels_per_group = config.pixels_per_group,
            degrees_per_group = config.degrees_per_group,
            "context created"
        );

        self.state = State::Initialized(Box::new(Database {
            config,
            space,
            store,
            matching: MatchConfig::default(),
            next_template_id: 0,
            templates_counter: 0,
        }));
        Ok(())
    }

    /// Releases the index. A no-op on an uninitialized context.
    pub fn destroy(&mut self) {
        if let State::Initialized(db) = std::mem::take(&mut self.state) {
            tracing::debug!(templates = db.templates_counter, "context destroyed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Initialized(_))
    }

    fn db(&self) -> Result<&Database> {
        match &self.state {
            State::Initialized(db) => Ok(&**db),
            State::Uninitialized => Err(IndexError::NotInitialized),
        }
    }

    fn db_mut(&mut self) -> Result<&mut Database> {
        match &mut self.state {
            State::Initialized(db) => Ok(&mut **db),
            State::Uninitialized => Err(IndexError::NotInitialized),
        }
    }

    pub fn set_match_tolerances(&mut self, x_tolerance: u32, y_tolerance: u32, t_tolerance: u32) -> Result<()> {
        let m = &mut self.db_mut()?.matching;
        m.x_tolerance = x_tolerance;
        m.y_tolerance = y_tolerance;
        m.t_tolerance = t_tolerance;
        Ok(())
    }

    /// `failure_threshold` is stored and reported but identification does
    /// not act on it.
    pub fn set_match_thresholds(
        &mut self,
        minutia_threshold: u32,
        template_threshold: u32,
        failure_threshold: u32,
    ) -> Result<()> {
        let m = &mut self.db_mut()?.matching;
        m.minutia_threshold = minutia_threshold;
        m.template_threshold = template_threshold;
        m.failure_threshold = failure_threshold;
        Ok(())
    }

    /// Replaces all match settings at once.
    pub fn set_match_config(&mut self, matching: MatchConfig) -> Result<()> {
        self.db_mut()?.matching = matching;
        Ok(())
    }

    /// Number of templates currently enrolled.
    pub fn template_counter(&self) -> Result<u32> {
        Ok(self.db()?.templates_counter)
    }

    /// Id the next enrolled template will receive. Ids are never reused.
    pub fn next_template_id(&self) -> Result<u32> {
        Ok(self.db()?.next_template_id)
    }

    pub fn database_config(&self) -> Result<&DatabaseConfig> {
        Ok(&self.db()?.config)
    }

    pub fn match_config(&self) -> Result<&MatchConfig> {
        Ok(&self.db()?.matching)
    }

    /// Total number of buckets in the index.
    pub fn bucket_count(&self) -> Result<usize> {
        Ok(self.db()?.space.bucket_count())
    }

    /// Bucket a relative `(x, y, t)` hashes to.
    pub fn bucket_index(&self, x: i64, y: i64, t: i64) -> Result<usize> {
        self.db()?.space.bucket_index(x, y, t)
    }

    /// References stored in `bucket`, in insertion order.
    pub fn bucket_entries(&self, bucket: usize) -> Result<&[MinutiaRef]> {
        Ok(self.db()?.store.entries(bucket))
    }

    /// Slots reserved for `bucket`.
    pub fn bucket_allocated(&self, bucket: usize) -> Result<usize> {
        Ok(self.db()?.store.allocated(bucket))
    }

    /// Number of buckets holding at least one reference.
    pub fn occupied_buckets(&self) -> Result<usize> {
        Ok(self.db()?.store.occupied())
    }

    /// Enrolls `tpl` and returns its template id.
    ///
    /// Either every neighbor descriptor is indexed or, on error, none is.
    pub fn add_template(&mut self, tpl: &Template) -> Result<u32> {
        let db = self.db_mut()?;
        let minutiae = tpl.minutiae()?;

        let template_id = db.next_template_id;
        let next = template_id
            .checked_add(1)
            .ok_or_else(|| IndexError::InvalidParameter("template ids exhausted".into()))?;
        let entries = enroll::insert_template(&mut db.store, &db.space, template_id, minutiae)?;

        db.next_template_id = next;
        db.templates_counter += 1;
        tracing::debug!(template_id, minutiae = minutiae.len(), entries, "template enrolled");
        Ok(template_id)
    }

    /// Removes the entries of `tpl` enrolled as `template_id`.
    ///
    /// `tpl` must have the same geometry it was enrolled with. Fails with
    /// `NotFound` if none of its entries are present and with
    /// `IncompleteRemoval` if only some were; in the latter case the found
    /// entries are gone and the rest stay indexed.
    pub fn remove_template(&mut self, tpl: &Template, template_id: u32) -> Result<()> {
        let db = self.db_mut()?;
        let minutiae = tpl.minutiae()?;

        enroll::remove_template(&mut db.store, &db.space, template_id, minutiae)?;
        db.templates_counter = db.templates_counter.saturating_sub(1);
        tracing::debug!(template_id, "template removed");
        Ok(())
    }

    /// Enrolled templates matching `tpl`, best first, at most
    /// [`MAX_MATCHES`](crate::MAX_MATCHES).
    pub fn identify(&self, tpl: &Template) -> Result<Vec<Match>> {
        let db = self.db()?;
        let scores = db.score(tpl)?;
        let matches = identify::rank(&scores, db.matching.template_threshold);
        tracing::debug!(candidates = matches.len(), "identification finished");
        Ok(matches)
    }

    /// The single best match for `tpl`, if any template passes the
    /// threshold.
    pub fn identify_best(&self, tpl: &Template) -> Result<Option<Match>> {
        let db = self.db()?;
        let scores = db.score(tpl)?;
        let best = identify::best(&scores, db.matching.template_threshold);
        tracing::debug!(?best, "identification finished");
        Ok(best)
    }
}

impl Database {
    fn score(&self, tpl: &Template) -> Result<Vec<u32>> {
        let probe = tpl.minutiae()?;
        identify::score_templates(&self.store, &self.space, &self.matching, self.next_template_id, probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut ctx = Context::new();
        assert!(!ctx.is_initialized());
        assert_eq!(ctx.template_counter().unwrap_err(), IndexError::NotInitialized);
        ctx.destroy();

        ctx.create(None).unwrap();
        assert!(ctx.is_initialized());
        assert_eq!(ctx.database_config().unwrap(), &DatabaseConfig::default());
        assert_eq!(ctx.create(None).unwrap_err(), IndexError::AlreadyInitialized);

        ctx.destroy();
        assert!(!ctx.is_initialized());
        ctx.destroy();
        ctx.create(Some(DatabaseConfig::default().with_max_coord(4, 4))).unwrap();
        assert_eq!(ctx.next_template_id().unwrap(), 0);
    }

    #[test]
    fn invalid_configuration_leaves_context_uninitialized() {
        let mut ctx = Context::new();
        let err = ctx.create(Some(DatabaseConfig::default().with_alloc_step(0))).unwrap_err();
        assert!(matches!(err, IndexError::InvalidConfiguration(_)));
        assert!(!ctx.is_initialized());
    }

    #[test]
    fn match_settings() {
        let mut ctx = Context::new();
        assert_eq!(ctx.set_match_tolerances(1, 2, 3).unwrap_err(), IndexError::NotInitialized);
        assert_eq!(ctx.set_match_thresholds(1, 2, 3).unwrap_err(), IndexError::NotInitialized);

        ctx.create(None).unwrap();
        assert_eq!(ctx.match_config().unwrap(), &MatchConfig::default());
        ctx.set_match_tolerances(1, 2, 3).unwrap();
        ctx.set_match_thresholds(4, 5, 6).unwrap();
        let m = ctx.match_config().unwrap();
        assert_eq!((m.x_tolerance, m.y_tolerance, m.t_tolerance), (1, 2, 3));
        assert_eq!((m.minutia_threshold, m.template_threshold, m.failure_threshold), (4, 5, 6));

        ctx.set_match_config(MatchConfig::default()).unwrap();
        assert_eq!(ctx.match_config().unwrap(), &MatchConfig::default());
    }

    #[test]
    fn uninitialized_template_is_rejected() {
        let mut ctx = Context::with_config(None).unwrap();
        let tpl = Template::default();
        assert_eq!(ctx.add_template(&tpl).unwrap_err(), IndexError::NotInitialized);
        assert_eq!(ctx.remove_template(&tpl, 0).unwrap_err(), IndexError::NotInitialized);
        assert_eq!(ctx.identify(&tpl).unwrap_err(), IndexError::NotInitialized);
        assert_eq!(ctx.identify_best(&tpl).unwrap_err(), IndexError::NotInitialized);
    }

    #[test]
    fn uninitialized_context_is_rejected() {
        let mut ctx = Context::new();
        let tpl = Template::from_points(&[(0, 0, 0), (3, 3, 0)], 1).unwrap();
        assert_eq!(ctx.add_template(&tpl).unwrap_err(), IndexError::NotInitialized);
        assert_eq!(ctx.identify(&tpl).unwrap_err(), IndexError::NotInitialized);
        assert_eq!(ctx.bucket_count().unwrap_err(), IndexError::NotInitialized);
    }

    #[test]
    fn empty_index_identifies_nothing() {
        let ctx = Context::with_config(None).unwrap();
        let tpl = Template::from_points(&[(0, 0, 0), (3, 3, 0)], 1).unwrap();
        assert!(ctx.identify(&tpl).unwrap().is_empty());
        assert_eq!(ctx.identify_best(&tpl).unwrap(), None);
    }
}
