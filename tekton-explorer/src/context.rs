//! Long-lived application context, built once at startup and passed to every component

use std::sync::Arc;
use tekton_cli::{CliExecutor, TerminalLine, Tkn, TknCli};
use tekton_shared::ExplorerConfig;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cache::ResourceCache;
use crate::explorer::PipelineExplorer;
use crate::host::Host;
use crate::notifier::ChangeNotifier;

#[derive(Clone)]
pub struct AppContext {
    pub tkn: Arc<dyn Tkn>,
    pub cache: Arc<ResourceCache>,
    pub explorer: Arc<PipelineExplorer>,
    pub host: Arc<dyn Host>,
}

impl AppContext {
    /// Wire the explorer around an existing CLI wrapper
    pub fn new(
        tkn: Arc<dyn Tkn>,
        host: Arc<dyn Host>,
        config: &ExplorerConfig,
        notifier: Option<ChangeNotifier>,
    ) -> Self {
        let cache = Arc::new(ResourceCache::new(tkn.clone(), &config.cache));
        let explorer = PipelineExplorer::start(cache.clone(), notifier, host.as_ref());

        Self {
            tkn,
            cache,
            explorer,
            host,
        }
    }

    /// Build everything from configuration: real tkn processes and the context file watch.
    ///
    /// A context file that cannot be watched only disables automatic refresh.
    pub fn from_config(
        config: &ExplorerConfig,
        host: Arc<dyn Host>,
        terminal: mpsc::UnboundedSender<TerminalLine>,
    ) -> Self {
        let executor = CliExecutor::new(&config.cli).with_terminal(terminal);
        let tkn: Arc<dyn Tkn> = Arc::new(TknCli::new(executor));

        let notifier = if config.watch.enabled {
            match config
                .kube_config_path()
                .and_then(|(dir, file)| ChangeNotifier::watch(&dir, &file))
            {
                Ok(notifier) => {
                    debug!("Watching {}", notifier.path().display());
                    Some(notifier)
                }
                Err(e) => {
                    warn!("Cluster context changes will not refresh the tree: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self::new(tkn, host, config, notifier)
    }

    /// Release the file watch and the tree widget. Call once at shutdown.
    pub fn dispose(&self) {
        self.explorer.dispose();
    }
}
