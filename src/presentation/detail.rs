use std::sync::Arc;
use tokio::sync::watch;

use super::{replace_state, TaskScope};
use crate::models::Feature;
use crate::usecases::UseCases;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub is_loading: bool,
    pub feature: Option<Feature>,
    pub error: Option<String>,
    pub is_editing: bool,
    pub is_saving: bool,
    pub is_deleting: bool,
}

impl DetailState {
    pub fn has_data(&self) -> bool {
        self.feature.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn can_edit(&self) -> bool {
        self.has_data() && !self.is_loading && !self.is_saving
    }

    pub fn can_save(&self) -> bool {
        self.is_editing
            && !self.is_saving
            && self.feature.as_ref().is_some_and(|f| {
                !f.title.trim().is_empty() && !f.description.trim().is_empty()
            })
    }
}

/// Drives the view/edit screen of a single feature.
///
/// Field edits only touch the in-memory copy; nothing is written until
/// [`DetailViewModel::save_changes`].
pub struct DetailViewModel {
    use_cases: UseCases,
    state: Arc<watch::Sender<DetailState>>,
    scope: TaskScope,
}

impl DetailViewModel {
    pub fn new(use_cases: UseCases) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            use_cases,
            state: Arc::new(state),
            scope: TaskScope::new(),
        }
    }

    pub fn state(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn load(&mut self, id: &str) {
        replace_state(&self.state, |s| DetailState {
            is_loading: true,
            error: None,
            ..s
        });

        let get = self.use_cases.get.clone();
        let state = self.state.clone();
        let id = id.to_string();
        self.scope.spawn(async move {
            let result = get.by_id(&id).await;
            replace_state(&state, |s| match result {
                Ok(Some(feature)) => DetailState {
                    is_loading: false,
                    feature: Some(feature),
                    error: None,
                    ..s
                },
                Ok(None) => DetailState {
                    is_loading: false,
                    feature: None,
                    error: Some("Feature not found".to_string()),
                    ..s
                },
                Err(e) => DetailState {
                    is_loading: false,
                    error: Some(e.to_string()),
                    ..s
                },
            });
        });
    }

    pub fn start_editing(&self) {
        replace_state(&self.state, |s| DetailState {
            is_editing: true,
            ..s
        });
    }

    /// Leaves edit mode. Unsaved field edits stay in the snapshot.
    pub fn cancel_editing(&self) {
        replace_state(&self.state, |s| DetailState {
            is_editing: false,
            ..s
        });
    }

    fn edit(&self, f: impl FnOnce(&mut Feature)) {
        replace_state(&self.state, |mut s| {
            if let Some(feature) = s.feature.as_mut() {
                f(feature);
            }
            s
        });
    }

    pub fn update_title(&self, title: &str) {
        self.edit(|f| f.title = title.to_string());
    }

    pub fn update_description(&self, description: &str) {
        self.edit(|f| f.description = description.to_string());
    }

    pub fn update_active(&self, is_active: bool) {
        self.edit(|f| f.is_active = is_active);
    }

    /// Creates the feature when it is a draft, updates it otherwise.
    pub fn save_changes(&mut self) {
        let Some(feature) = self.state.borrow().feature.clone() else {
            return;
        };
        replace_state(&self.state, |s| DetailState {
            is_saving: true,
            error: None,
            ..s
        });

        let save = self.use_cases.save.clone();
        let state = self.state.clone();
        self.scope.spawn(async move {
            let result = if feature.is_draft() {
                save.create(&feature).await
            } else {
                save.update(&feature).await
            };
            replace_state(&state, |s| match result {
                Ok(saved) => DetailState {
                    is_saving: false,
                    feature: Some(saved),
                    is_editing: false,
                    error: None,
                    ..s
                },
                Err(e) => DetailState {
                    is_saving: false,
                    error: Some(e.to_string()),
                    ..s
                },
            });
        });
    }

    /// Deletes the shown feature. Drafts have nothing to delete.
    pub fn delete_feature(&mut self) {
        let id = match self.state.borrow().feature.as_ref() {
            Some(feature) if !feature.is_draft() => feature.id.clone(),
            _ => return,
        };
        replace_state(&self.state, |s| DetailState {
            is_deleting: true,
            error: None,
            ..s
        });

        let save = self.use_cases.save.clone();
        let state = self.state.clone();
        self.scope.spawn(async move {
            let result = save.delete(&id).await;
            replace_state(&state, |s| match result {
                Ok(()) => DetailState {
                    is_deleting: false,
                    feature: None,
                    ..s
                },
                Err(e) => DetailState {
                    is_deleting: false,
                    error: Some(e.to_string()),
                    ..s
                },
            });
        });
    }

    /// Starts editing a blank draft.
    pub fn create_new(&self) {
        replace_state(&self.state, |s| DetailState {
            feature: Some(Feature::empty()),
            is_editing: true,
            ..s
        });
    }

    pub fn clear_error(&self) {
        replace_state(&self.state, |s| DetailState { error: None, ..s });
    }
}
