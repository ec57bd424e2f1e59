//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use url::Url;

use link_unwrapper::chain::ChainError;
use link_unwrapper::config::{parse_config, UnwrapperConfig};
use link_unwrapper::http::HttpServer;
use link_unwrapper::lifecycle::Shutdown;
use link_unwrapper::resolver::{HostRegistry, Probe, Prober, Probing, Resolver};

/// Answers probes from a fixed table keyed by endpoint URL.
///
/// Endpoints without an entry answer with no `Location` header.
#[derive(Default)]
pub struct ScriptedProber {
    routes: HashMap<String, Result<String, ChainError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProber {
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.routes.insert(from.to_string(), Ok(to.to_string()));
        self
    }

    pub fn fail(mut self, from: &str, error: ChainError) -> Self {
        self.routes.insert(from.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Prober for ScriptedProber {
    fn probe<'a>(&'a self, resolver: &'a Resolver, path: &'a str) -> Probing<'a> {
        Box::pin(async move {
            let endpoint = resolver.endpoint(path);
            let key = endpoint.to_string();
            self.calls.lock().unwrap().push(key.clone());
            let outcome = match self.routes.get(&key) {
                Some(Ok(to)) => Url::parse(to).map_err(|_| ChainError::MalformedTarget {
                    endpoint: key.clone(),
                    location: to.clone(),
                }),
                Some(Err(e)) => Err(e.clone()),
                None => Err(ChainError::NoRedirectTarget { endpoint: key }),
            };
            Probe { endpoint, outcome }
        })
    }
}

/// Config with one redirector per host and an upstream DNS that is never queried.
pub fn config_for(hosts: &[&str]) -> UnwrapperConfig {
    config_with_permitted(hosts, &[])
}

/// Like [`config_for`], with `permitted` query params on every redirector.
pub fn config_with_permitted(hosts: &[&str], permitted: &[&str]) -> UnwrapperConfig {
    let permitted = permitted
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let mut toml = String::from("[upstream]\ndns = \"127.0.0.1:53\"\n\n[chain]\nmax_hops = 4\n\n");
    for host in hosts {
        toml.push_str(&format!(
            "[[redirectors]]\nhost = \"{host}\"\ndescription = \"{host} shortener\"\npermitted_query_params = [{permitted}]\n\n"
        ));
    }
    parse_config(&toml).unwrap()
}

/// A running server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub prober: Arc<ScriptedProber>,
    shutdown: Shutdown,
    task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub async fn start(config: UnwrapperConfig, prober: ScriptedProber) -> Self {
        let registry = Arc::new(HostRegistry::from_config(&config).unwrap());
        let prober = Arc::new(prober);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::with_prober(config, registry, prober.clone());
        let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

        Self {
            addr,
            prober,
            shutdown,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        self.task.await.unwrap().unwrap();
    }
}
