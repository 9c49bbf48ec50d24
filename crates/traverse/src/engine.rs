//! Depth-first, pre-order walk with per-object symlink policy

use crate::guard::RootGuard;
use selutils_errors::{PlatformError, TraversalError, UserFacingError};
use selutils_events::{EventEmitter, EventSender, PolicySummary, TraversalEvent};
use selutils_platform::{ContextApplier, FileIdentity, Filesystem, Platform};
use selutils_types::{ObjectKind, Outcome, TraversalMode, TraversalPolicy};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

/// Tunables that do not change which objects a policy selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Longest symlink chain followed before the link is reported as a cycle.
    pub max_symlink_chain: usize,
    /// Visit directory entries in byte order of their names instead of
    /// enumeration order.
    pub sort_entries: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_symlink_chain: 40,
            sort_entries: true,
        }
    }
}

/// Walks roots under a [`TraversalPolicy`] and applies labels.
///
/// The engine is synchronous and single threaded. It holds no outcome state:
/// each [`Outcome`] is handed to the caller's sink as soon as it is known.
pub struct TraversalEngine<'a> {
    filesystem: &'a dyn Filesystem,
    applier: &'a dyn ContextApplier,
    options: EngineOptions,
    event_sender: Option<EventSender>,
}

impl<'a> TraversalEngine<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, applier: &'a dyn ContextApplier) -> Self {
        Self {
            filesystem,
            applier,
            options: EngineOptions::default(),
            event_sender: None,
        }
    }

    /// Engine over the collaborators bundled in `platform`.
    pub fn from_platform(platform: &'a Platform) -> Self {
        Self::new(platform.filesystem(), platform.applier())
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Walk `roots` and collect every outcome.
    ///
    /// Returns the outcomes in visiting order and whether all of them
    /// succeeded.
    pub fn run<P: AsRef<Path>>(&self, roots: &[P], policy: &TraversalPolicy) -> (Vec<Outcome>, bool) {
        let mut outcomes = Vec::new();
        let success = self.run_with(roots, policy, |outcome| outcomes.push(outcome));
        (outcomes, success)
    }

    /// Walk `roots`, passing each outcome to `sink` as it is produced.
    ///
    /// Roots are walked in the order given. Returns `true` when every
    /// outcome succeeded.
    ///
    /// A directory that is labelled but cannot be listed yields two outcomes
    /// for the same path: the successful label, then the enumeration failure.
    pub fn run_with<P, F>(&self, roots: &[P], policy: &TraversalPolicy, sink: F) -> bool
    where
        P: AsRef<Path>,
        F: FnMut(Outcome),
    {
        let start = Instant::now();
        let run_id = Uuid::new_v4().to_string();

        self.emit_traversal(TraversalEvent::RunStarted {
            run_id: run_id.clone(),
            roots: roots.len(),
            policy: PolicySummary::from(policy),
        });

        let root_guard = (policy.recursive() && policy.root_guard_enabled())
            .then(|| RootGuard::capture(self.filesystem));

        let mut walk = Walk {
            engine: self,
            policy,
            run_id,
            root_guard,
            sink,
            stack: Vec::new(),
            visited: 0,
            failed: 0,
        };

        for root in roots {
            walk.stack.push(WorkItem::root(root.as_ref()));
            while let Some(item) = walk.stack.pop() {
                walk.visit(&item);
            }
        }

        let Walk {
            run_id,
            visited,
            failed,
            ..
        } = walk;

        tracing::debug!(run_id = %run_id, visited, failed, "traversal finished");
        self.emit_traversal(TraversalEvent::RunCompleted {
            run_id,
            visited,
            failed,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        });

        failed == 0
    }
}

impl EventEmitter for TraversalEngine<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// A path waiting to be visited.
struct WorkItem {
    path: PathBuf,
    /// 0 for command line operands.
    depth: usize,
    /// Identities of the directories this item was reached through.
    ancestors: Rc<[FileIdentity]>,
}

impl WorkItem {
    fn root(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            depth: 0,
            ancestors: Rc::from(Vec::new()),
        }
    }
}

/// State of one `run_with` call.
struct Walk<'r, 'a, F> {
    engine: &'r TraversalEngine<'a>,
    policy: &'r TraversalPolicy,
    run_id: String,
    root_guard: Option<RootGuard>,
    sink: F,
    stack: Vec<WorkItem>,
    visited: usize,
    failed: usize,
}

impl<F: FnMut(Outcome)> Walk<'_, '_, F> {
    fn visit(&mut self, item: &WorkItem) {
        let kind = match self.engine.filesystem.classify(&item.path) {
            Ok(kind) => kind,
            Err(err) => {
                let error = TraversalError::Classification {
                    path: display(&item.path),
                    message: err.cause().into_owned(),
                };
                self.record(Outcome::failed(&item.path, None, error));
                return;
            }
        };

        match kind {
            ObjectKind::Regular | ObjectKind::Other => self.apply(&item.path, kind),
            ObjectKind::Directory => self.directory(item, &item.path),
            ObjectKind::Symlink => self.symlink(item),
        }
    }

    /// Label the directory at `target`, then queue its entries under
    /// `item.path`. The two differ when `item` is a followed symlink.
    fn directory(&mut self, item: &WorkItem, target: &Path) {
        if !self.policy.recursive() {
            self.apply(target, ObjectKind::Directory);
            return;
        }

        let identity = match self.engine.filesystem.identity(target) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::debug!(path = %target.display(), error = %err, "directory identity unavailable");
                None
            }
        };

        if let Some(guard) = &self.root_guard {
            if guard.refuses(target, identity) {
                let error = TraversalError::RootGuard {
                    path: display(&item.path),
                };
                self.record(Outcome::failed(&item.path, Some(ObjectKind::Directory), error));
                return;
            }
        }

        if let Some(identity) = identity {
            if let Some(position) = item.ancestors.iter().position(|seen| *seen == identity) {
                let error = TraversalError::CycleDetected {
                    path: display(&item.path),
                    chain_length: item.ancestors.len() - position,
                };
                self.record(Outcome::failed(&item.path, Some(ObjectKind::Directory), error));
                return;
            }
        }

        self.apply(target, ObjectKind::Directory);

        let mut entries = match self.engine.filesystem.read_dir(&item.path) {
            Ok(entries) => entries,
            Err(err) => {
                let error = TraversalError::Enumeration {
                    path: display(&item.path),
                    message: err.cause().into_owned(),
                };
                self.record(Outcome::failed(&item.path, Some(ObjectKind::Directory), error));
                return;
            }
        };
        if self.engine.options.sort_entries {
            entries.sort();
        }

        self.engine.emit_traversal(TraversalEvent::DirectoryEntered {
            run_id: self.run_id.clone(),
            path: item.path.clone(),
            entries: entries.len(),
        });

        let ancestors: Rc<[FileIdentity]> = match identity {
            Some(identity) => item
                .ancestors
                .iter()
                .copied()
                .chain(std::iter::once(identity))
                .collect(),
            None => Rc::clone(&item.ancestors),
        };
        let depth = item.depth + 1;

        // Reversed so the first entry is popped first.
        self.stack.extend(entries.into_iter().rev().map(|path| WorkItem {
            path,
            depth,
            ancestors: Rc::clone(&ancestors),
        }));
    }

    fn symlink(&mut self, item: &WorkItem) {
        if !self.policy.dereference() {
            self.apply(&item.path, ObjectKind::Symlink);
            return;
        }

        let follow_all = self.policy.mode() == TraversalMode::FollowAllLinks;
        let mut seen = HashSet::from([item.path.clone()]);
        let mut current = item.path.clone();
        let mut hops = 0usize;

        loop {
            let target = match self.engine.filesystem.resolve_symlink(&current) {
                Ok(target) => target,
                Err(err) => {
                    self.unresolvable(item, &err);
                    return;
                }
            };

            hops += 1;
            if hops > self.engine.options.max_symlink_chain || !seen.insert(target.clone()) {
                let error = TraversalError::CycleDetected {
                    path: display(&item.path),
                    chain_length: hops,
                };
                self.record(Outcome::failed(&item.path, Some(ObjectKind::Symlink), error));
                return;
            }

            let target_kind = match self.engine.filesystem.classify(&target) {
                Ok(kind) => kind,
                Err(err) => {
                    self.unresolvable(item, &err);
                    return;
                }
            };

            self.engine.emit_traversal(TraversalEvent::SymlinkResolved {
                run_id: self.run_id.clone(),
                link: current.clone(),
                target: target.clone(),
                target_kind,
            });

            match target_kind {
                ObjectKind::Directory if self.follows_directories(item.depth) => {
                    self.directory(item, &target);
                }
                ObjectKind::Symlink if follow_all => {
                    current = target;
                    continue;
                }
                ObjectKind::Regular | ObjectKind::Other if follow_all => {
                    self.apply(&target, target_kind);
                }
                _ => self.apply(&item.path, ObjectKind::Symlink),
            }
            return;
        }
    }

    /// Command line operands are always followed to directories once
    /// dereferencing is on. Links met while recursing only under `-L`.
    fn follows_directories(&self, depth: usize) -> bool {
        depth == 0 || self.policy.mode() == TraversalMode::FollowAllLinks
    }

    fn unresolvable(&mut self, item: &WorkItem, err: &PlatformError) {
        let error = TraversalError::Resolution {
            path: display(&item.path),
            message: err.cause().into_owned(),
        };
        self.record(Outcome::failed(&item.path, Some(ObjectKind::Symlink), error));
    }

    fn apply(&mut self, path: &Path, kind: ObjectKind) {
        let outcome = match self.engine.applier.apply(path) {
            Ok(()) => Outcome::applied(path, kind),
            Err(err) => {
                let error = TraversalError::Apply {
                    path: display(path),
                    message: err.cause().into_owned(),
                };
                Outcome::failed(path, Some(kind), error)
            }
        };
        self.record(outcome);
    }

    fn record(&mut self, outcome: Outcome) {
        self.visited += 1;

        match (&outcome.error, outcome.kind) {
            (Some(error), _) => {
                self.failed += 1;
                tracing::warn!(
                    path = %outcome.path.display(),
                    code = error.user_code().unwrap_or_default(),
                    "{error}"
                );
                self.engine.emit_traversal(TraversalEvent::ObjectFailed {
                    run_id: self.run_id.clone(),
                    path: outcome.path.clone(),
                    code: error.user_code().map(str::to_string),
                    message: error.to_string(),
                });
            }
            (None, Some(kind)) => {
                tracing::debug!(path = %outcome.path.display(), %kind, "context applied");
                self.engine.emit_traversal(TraversalEvent::ObjectApplied {
                    run_id: self.run_id.clone(),
                    path: outcome.path.clone(),
                    kind,
                });
            }
            (None, None) => {}
        }

        (self.sink)(outcome);
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use selutils_types::TraversalFlags;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    enum Node {
        File,
        Dir,
        Link(PathBuf),
    }

    /// In-memory tree without links in intermediate path components.
    #[derive(Default)]
    struct MemoryFs {
        nodes: BTreeMap<PathBuf, Node>,
        unreadable: HashSet<PathBuf>,
    }

    impl MemoryFs {
        fn dir(mut self, path: &str) -> Self {
            self.nodes.insert(path.into(), Node::Dir);
            self
        }

        fn file(mut self, path: &str) -> Self {
            self.nodes.insert(path.into(), Node::File);
            self
        }

        fn link(mut self, path: &str, target: &str) -> Self {
            self.nodes.insert(path.into(), Node::Link(target.into()));
            self
        }

        fn unreadable(mut self, path: &str) -> Self {
            self.unreadable.insert(path.into());
            self
        }

        fn missing(path: &Path) -> PlatformError {
            PlatformError::FilesystemOperationFailed {
                operation: "lstat".into(),
                path: path.display().to_string(),
                message: "No such file or directory".into(),
            }
        }
    }

    impl Filesystem for MemoryFs {
        fn classify(&self, path: &Path) -> Result<ObjectKind, PlatformError> {
            match self.nodes.get(path) {
                Some(Node::File) => Ok(ObjectKind::Regular),
                Some(Node::Dir) => Ok(ObjectKind::Directory),
                Some(Node::Link(_)) => Ok(ObjectKind::Symlink),
                None => Err(Self::missing(path)),
            }
        }

        fn resolve_symlink(&self, path: &Path) -> Result<PathBuf, PlatformError> {
            match self.nodes.get(path) {
                Some(Node::Link(target)) => Ok(target.clone()),
                _ => Err(Self::missing(path)),
            }
        }

        fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, PlatformError> {
            if self.unreadable.contains(path) {
                return Err(PlatformError::PermissionDenied {
                    operation: "read_dir".into(),
                    path: path.display().to_string(),
                });
            }
            // Reverse order so sorting is observable.
            Ok(self
                .nodes
                .keys()
                .filter(|candidate| candidate.parent() == Some(path))
                .rev()
                .cloned()
                .collect())
        }

        fn identity(&self, path: &Path) -> Result<FileIdentity, PlatformError> {
            let mut current = path.to_path_buf();
            for _ in 0..8 {
                match self.nodes.get(&current) {
                    Some(Node::Link(target)) => current = target.clone(),
                    Some(_) => {
                        let ino = self.nodes.keys().position(|key| *key == current).unwrap_or(0);
                        return Ok(FileIdentity { dev: 1, ino: ino as u64 });
                    }
                    None => break,
                }
            }
            Err(Self::missing(path))
        }
    }

    #[derive(Default)]
    struct Spy {
        calls: RefCell<Vec<PathBuf>>,
        fail_on: Option<PathBuf>,
    }

    impl ContextApplier for Spy {
        fn apply(&self, path: &Path) -> Result<(), PlatformError> {
            self.calls.borrow_mut().push(path.to_path_buf());
            if self.fail_on.as_deref() == Some(path) {
                return Err(PlatformError::LabelOperationFailed {
                    operation: "setxattr".into(),
                    path: path.display().to_string(),
                    message: "Operation not supported".into(),
                });
            }
            Ok(())
        }
    }

    fn policy(recursive: bool, dereference: bool, mode: TraversalMode, preserve_root: bool) -> TraversalPolicy {
        TraversalPolicy::resolve(TraversalFlags {
            recursive,
            dereference,
            mode,
            preserve_root,
        })
        .unwrap()
    }

    fn calls(spy: &Spy) -> Vec<PathBuf> {
        spy.calls.borrow().clone()
    }

    #[test]
    fn test_entries_sorted_pre_order() {
        let fs = MemoryFs::default()
            .dir("/t")
            .file("/t/b")
            .file("/t/a")
            .dir("/t/c")
            .file("/t/c/d");
        let spy = Spy::default();
        let engine = TraversalEngine::new(&fs, &spy);
        let (_, success) = engine.run(&["/t"], &policy(true, false, TraversalMode::NoFollowLinks, false));

        assert!(success);
        let expected: Vec<PathBuf> = ["/t", "/t/a", "/t/b", "/t/c", "/t/c/d"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(calls(&spy), expected);
    }

    #[test]
    fn test_unsorted_keeps_enumeration_order() {
        let fs = MemoryFs::default().dir("/t").file("/t/a").file("/t/b");
        let spy = Spy::default();
        let engine = TraversalEngine::new(&fs, &spy).with_options(EngineOptions {
            sort_entries: false,
            ..EngineOptions::default()
        });
        engine.run(&["/t"], &policy(true, false, TraversalMode::NoFollowLinks, false));

        assert_eq!(calls(&spy)[1], PathBuf::from("/t/b"));
    }

    #[test]
    fn test_non_recursive_directory_not_listed() {
        let fs = MemoryFs::default().dir("/t").file("/t/a");
        let spy = Spy::default();
        let (outcomes, success) = TraversalEngine::new(&fs, &spy)
            .run(&["/t"], &policy(false, true, TraversalMode::NoFollowLinks, false));

        assert!(success);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(calls(&spy), vec![PathBuf::from("/t")]);
    }

    #[test]
    fn test_root_guard_refuses_root() {
        let fs = MemoryFs::default().dir("/").dir("/etc");
        let spy = Spy::default();
        let (outcomes, success) = TraversalEngine::new(&fs, &spy)
            .run(&["/"], &policy(true, false, TraversalMode::NoFollowLinks, true));

        assert!(!success);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0].error,
            Some(TraversalError::RootGuard { .. })
        ));
        assert!(calls(&spy).is_empty());
    }

    #[test]
    fn test_root_guard_catches_link_to_root() {
        let fs = MemoryFs::default()
            .dir("/")
            .dir("/srv")
            .link("/srv/up", "/")
            .file("/srv/x");
        let spy = Spy::default();
        let (outcomes, success) = TraversalEngine::new(&fs, &spy)
            .run(&["/srv"], &policy(true, true, TraversalMode::FollowAllLinks, true));

        assert!(!success);
        let refused: Vec<_> = outcomes
            .iter()
            .filter(|outcome| matches!(outcome.error, Some(TraversalError::RootGuard { .. })))
            .collect();
        assert_eq!(refused.len(), 1);
        assert_eq!(refused[0].path, PathBuf::from("/srv/up"));
        assert!(!calls(&spy).contains(&PathBuf::from("/")));
        assert!(calls(&spy).contains(&PathBuf::from("/srv/x")));
    }

    #[test]
    fn test_root_guard_off_walks_root() {
        let fs = MemoryFs::default().dir("/").file("/f");
        let spy = Spy::default();
        let (_, success) = TraversalEngine::new(&fs, &spy)
            .run(&["/"], &policy(true, false, TraversalMode::NoFollowLinks, false));

        assert!(success);
        assert_eq!(calls(&spy), vec![PathBuf::from("/"), PathBuf::from("/f")]);
    }

    #[test]
    fn test_enumeration_failure_is_local() {
        let fs = MemoryFs::default()
            .dir("/t")
            .dir("/t/locked")
            .file("/t/locked/hidden")
            .file("/t/z")
            .unreadable("/t/locked");
        let spy = Spy::default();
        let (outcomes, success) = TraversalEngine::new(&fs, &spy)
            .run(&["/t"], &policy(true, false, TraversalMode::NoFollowLinks, false));

        assert!(!success);
        let failed: Vec<_> = outcomes.iter().filter(|outcome| !outcome.succeeded()).collect();
        assert_eq!(failed.len(), 1);
        assert!(matches!(
            failed[0].error,
            Some(TraversalError::Enumeration { .. })
        ));
        // The directory itself was labelled before listing failed.
        assert!(calls(&spy).contains(&PathBuf::from("/t/locked")));
        let locked: Vec<_> = outcomes
            .iter()
            .filter(|outcome| outcome.path == Path::new("/t/locked"))
            .collect();
        assert_eq!(locked.len(), 2);
        assert!(locked[0].succeeded());
        assert!(!locked[1].succeeded());
        assert!(calls(&spy).contains(&PathBuf::from("/t/z")));
        assert!(!calls(&spy).contains(&PathBuf::from("/t/locked/hidden")));
    }

    #[test]
    fn test_missing_root_does_not_stop_later_roots() {
        let fs = MemoryFs::default().file("/a");
        let spy = Spy::default();
        let (outcomes, success) = TraversalEngine::new(&fs, &spy)
            .run(&["/missing", "/a"], &policy(false, true, TraversalMode::NoFollowLinks, false));

        assert!(!success);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].kind, None);
        assert!(matches!(
            outcomes[0].error,
            Some(TraversalError::Classification { .. })
        ));
        assert!(outcomes[1].succeeded());
    }

    #[test]
    fn test_non_directory_target_labels_link_unless_follow_all() {
        let fs = MemoryFs::default().dir("/t").file("/t/f").link("/t/l", "/t/f");
        let spy = Spy::default();
        TraversalEngine::new(&fs, &spy)
            .run(&["/t/l"], &policy(true, true, TraversalMode::FollowLinksToDirsOnCommandLine, false));
        assert_eq!(calls(&spy), vec![PathBuf::from("/t/l")]);

        let spy = Spy::default();
        TraversalEngine::new(&fs, &spy)
            .run(&["/t/l"], &policy(true, true, TraversalMode::FollowAllLinks, false));
        assert_eq!(calls(&spy), vec![PathBuf::from("/t/f")]);
    }

    #[test]
    fn test_chain_longer_than_limit_is_cycle() {
        let fs = MemoryFs::default()
            .link("/l1", "/l2")
            .link("/l2", "/l3")
            .link("/l3", "/f")
            .file("/f");
        let spy = Spy::default();
        let engine = TraversalEngine::new(&fs, &spy).with_options(EngineOptions {
            max_symlink_chain: 2,
            ..EngineOptions::default()
        });
        let (outcomes, success) =
            engine.run(&["/l1"], &policy(true, true, TraversalMode::FollowAllLinks, false));

        assert!(!success);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0].error,
            Some(TraversalError::CycleDetected { chain_length: 3, .. })
        ));
        assert!(calls(&spy).is_empty());
    }

    #[test]
    fn test_link_to_ancestor_directory_is_cycle() {
        let fs = MemoryFs::default()
            .dir("/t")
            .dir("/t/sub")
            .link("/t/sub/back", "/t");
        let spy = Spy::default();
        let (outcomes, success) = TraversalEngine::new(&fs, &spy)
            .run(&["/t"], &policy(true, true, TraversalMode::FollowAllLinks, false));

        assert!(!success);
        let cycle = outcomes
            .iter()
            .find(|outcome| !outcome.succeeded())
            .unwrap();
        assert_eq!(cycle.path, PathBuf::from("/t/sub/back"));
        assert!(matches!(
            cycle.error,
            Some(TraversalError::CycleDetected { chain_length: 2, .. })
        ));
        assert_eq!(calls(&spy), vec![PathBuf::from("/t"), PathBuf::from("/t/sub")]);
    }

    #[test]
    fn test_events_bracket_the_run() {
        let fs = MemoryFs::default().file("/a");
        let spy = Spy::default();
        let (tx, rx) = selutils_events::channel();
        TraversalEngine::new(&fs, &spy)
            .with_event_sender(tx)
            .run(&["/a"], &policy(false, false, TraversalMode::NoFollowLinks, false));

        let events: Vec<_> = rx.try_iter().collect();
        assert!(matches!(
            events.first().map(|message| &message.event),
            Some(selutils_events::AppEvent::Traversal(TraversalEvent::RunStarted { roots: 1, .. }))
        ));
        assert!(matches!(
            events.last().map(|message| &message.event),
            Some(selutils_events::AppEvent::Traversal(TraversalEvent::RunCompleted {
                visited: 1,
                failed: 0,
                ..
            }))
        ));
    }
}
