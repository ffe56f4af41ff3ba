use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use super::{replace_state, TaskScope};
use crate::models::Feature;
use crate::usecases::UseCases;

/// Snapshot of the feature list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct MainState {
    pub is_loading: bool,
    pub features: Vec<Feature>,
    pub error: Option<String>,
    pub is_refreshing: bool,
    pub search_query: String,
    pub show_only_active: bool,
}

impl Default for MainState {
    fn default() -> Self {
        Self {
            is_loading: false,
            features: Vec::new(),
            error: None,
            is_refreshing: false,
            search_query: String::new(),
            show_only_active: true,
        }
    }
}

impl MainState {
    pub fn has_data(&self) -> bool {
        !self.features.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_loading && !self.has_error() && self.features.is_empty()
    }
}

/// Drives the feature list.
///
/// The list is fed either by a live observation of the local store or, while
/// a search query is set, by a one-shot remote search. Only one feed runs at
/// a time.
pub struct MainViewModel {
    use_cases: UseCases,
    state: Arc<watch::Sender<MainState>>,
    scope: TaskScope,
    feed: Option<AbortHandle>,
    observing: bool,
}

impl MainViewModel {
    /// Creates the view model and starts observing the local store.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(use_cases: UseCases) -> Self {
        let (state, _) = watch::channel(MainState::default());
        let mut view_model = Self {
            use_cases,
            state: Arc::new(state),
            scope: TaskScope::new(),
            feed: None,
            observing: false,
        };
        view_model.load_features();
        view_model
    }

    pub fn state(&self) -> watch::Receiver<MainState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> MainState {
        self.state.borrow().clone()
    }

    fn stop_feed(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
        self.observing = false;
    }

    /// (Re)starts the live observation, honouring `show_only_active`.
    pub fn load_features(&mut self) {
        self.stop_feed();
        replace_state(&self.state, |s| MainState {
            is_loading: true,
            error: None,
            ..s
        });

        let mut features = if self.state.borrow().show_only_active {
            self.use_cases.get.active()
        } else {
            self.use_cases.get.all()
        };
        let state = self.state.clone();

        self.feed = Some(self.scope.spawn(async move {
            while let Some(snapshot) = features.next().await {
                match snapshot {
                    Ok(features) => replace_state(&state, |s| MainState {
                        is_loading: false,
                        features,
                        error: None,
                        ..s
                    }),
                    Err(e) => replace_state(&state, |s| MainState {
                        is_loading: false,
                        error: Some(e.to_string()),
                        ..s
                    }),
                }
            }
        }));
        self.observing = true;
    }

    /// Replaces local contents with the server's and keeps observing.
    pub fn refresh(&mut self) {
        if !self.observing {
            self.load_features();
        }
        replace_state(&self.state, |s| MainState {
            is_refreshing: true,
            ..s
        });

        let sync = self.use_cases.sync.clone();
        let state = self.state.clone();
        self.scope.spawn(async move {
            let result = sync.sync().await;
            replace_state(&state, |s| match result {
                Ok(_) => MainState {
                    is_refreshing: false,
                    ..s
                },
                Err(e) => MainState {
                    is_refreshing: false,
                    error: Some(e.to_string()),
                    ..s
                },
            });
        });
    }

    /// Runs a remote search; a blank query goes back to the live list.
    pub fn search(&mut self, query: &str) {
        replace_state(&self.state, |s| MainState {
            search_query: query.to_string(),
            ..s
        });

        if query.trim().is_empty() {
            self.load_features();
            return;
        }

        self.stop_feed();
        replace_state(&self.state, |s| MainState {
            is_loading: true,
            error: None,
            ..s
        });

        let get = self.use_cases.get.clone();
        let state = self.state.clone();
        let query = query.to_string();
        self.feed = Some(self.scope.spawn(async move {
            let result = get.search(&query).await;
            replace_state(&state, |s| match result {
                Ok(features) => MainState {
                    is_loading: false,
                    features,
                    error: None,
                    ..s
                },
                Err(e) => MainState {
                    is_loading: false,
                    error: Some(e.to_string()),
                    ..s
                },
            });
        }));
    }

    pub fn toggle_show_only_active(&mut self) {
        replace_state(&self.state, |s| MainState {
            show_only_active: !s.show_only_active,
            ..s
        });
        self.load_features();
    }

    pub fn delete_feature(&mut self, id: &str) {
        let save = self.use_cases.save.clone();
        let state = self.state.clone();
        let id = id.to_string();
        self.scope.spawn(async move {
            match save.delete(&id).await {
                // The live feed picks the removal up; search results are pruned here
                Ok(()) => replace_state(&state, |mut s| {
                    s.features.retain(|f| f.id != id);
                    s
                }),
                Err(e) => replace_state(&state, |s| MainState {
                    error: Some(e.to_string()),
                    ..s
                }),
            }
        });
    }

    pub fn clear_error(&self) {
        replace_state(&self.state, |s| MainState { error: None, ..s });
    }
}
