use crate::pages::{DemoState, register_pages};
use crate::router::{FsTemplates, Origin, PageRouter, RouterError};
use crate::storage::KvStore;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Navigation state and demo selections for the single operator.
pub struct Session {
    pub router: PageRouter<FsTemplates>,
    pub demo: DemoState,
}

/// Shared handler state. Lock `session` before `data` when both are needed.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<KvStore>>,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(
        data_path: PathBuf,
        data: KvStore,
        template_dir: PathBuf,
        origin: Origin,
    ) -> Result<Self, RouterError> {
        let mut router = PageRouter::new(FsTemplates::new(template_dir), origin);
        register_pages(&mut router)?;
        Ok(Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            session: Arc::new(Mutex::new(Session {
                router,
                demo: DemoState::default(),
            })),
        })
    }
}
