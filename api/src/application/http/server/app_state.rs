use std::sync::Arc;

use nutrivision_core::application::NutrivisionService;

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: NutrivisionService,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: NutrivisionService) -> Self {
        Self { args, service }
    }
}
