use crate::{
    forwarder::{HttpForwarder, HyperForwarder},
    mutations::Mutations,
    playback_server::InteractionMode,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug)]
pub struct PlaybackConfiguration {
    domain_name: Option<String>,
    interaction_mode: InteractionMode,
    markdown_path: PathBuf,
    forwarder: Option<Arc<dyn HttpForwarder + Send + Sync>>,
    record_request_mutations: Mutations,
    record_response_mutations: Mutations,
    playback_response_mutations: Mutations,
}

impl PlaybackConfiguration {
    pub fn new<P: Into<PathBuf>>(mode: InteractionMode, markdown_path: P) -> Self {
        Self {
            interaction_mode: mode,
            domain_name: None,
            markdown_path: markdown_path.into(),
            forwarder: None,
            record_request_mutations: Mutations::new(),
            record_response_mutations: Mutations::new(),
            playback_response_mutations: Mutations::new(),
        }
    }

    pub fn playback<P: Into<PathBuf>>(markdown_path: P) -> Self {
        Self::new(InteractionMode::Playback, markdown_path)
    }

    pub fn record<P: Into<PathBuf>, S: Into<String>>(markdown_path: P, domain_name: S) -> Self {
        let mut configuration = Self::new(InteractionMode::Record, markdown_path);
        configuration.set_domain_name(domain_name);
        configuration
    }

    pub fn set_domain_name<S: Into<String>>(&mut self, domain_name: S) {
        self.domain_name = Some(domain_name.into());
    }

    pub fn domain_name(&self) -> Option<&String> {
        self.domain_name.as_ref()
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction_mode
    }

    pub fn markdown_path(&self) -> &Path {
        &self.markdown_path
    }

    pub fn forwarder(&self) -> Arc<dyn HttpForwarder + Send + Sync> {
        self.forwarder
            .clone()
            .unwrap_or_else(|| Arc::new(HyperForwarder::new()))
    }

    pub fn set_forwarder(&mut self, forwarder: Arc<dyn HttpForwarder + Send + Sync>) {
        self.forwarder = Some(forwarder);
    }

    pub fn add_record_request_mutations<F: FnOnce(&mut Mutations) -> &mut Mutations>(
        &mut self,
        func: F,
    ) {
        let _ = func(&mut self.record_request_mutations);
    }

    pub fn add_record_response_mutations<F: FnOnce(&mut Mutations) -> &mut Mutations>(
        &mut self,
        func: F,
    ) {
        let _ = func(&mut self.record_response_mutations);
    }

    pub fn add_playback_response_mutations<F: FnOnce(&mut Mutations) -> &mut Mutations>(
        &mut self,
        func: F,
    ) {
        let _ = func(&mut self.playback_response_mutations);
    }

    pub fn record_request_mutations(&self) -> &Mutations {
        &self.record_request_mutations
    }

    pub fn record_response_mutations(&self) -> &Mutations {
        &self.record_response_mutations
    }

    pub fn playback_response_mutations(&self) -> &Mutations {
        &self.playback_response_mutations
    }
}
