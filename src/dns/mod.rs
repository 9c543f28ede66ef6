//! DNS query transport used by the probes
//!
//! A probe only needs one operation from the network: send a single query to a
//! single resolver and report whether a well-formed answer came back. That
//! operation lives behind [`QueryTransport`] so the probing engine can be driven
//! by synthetic resolvers in tests.

use crate::{
    error::{AppError, Result},
    models::SampleQuery,
    types::QueryType,
};
use async_trait::async_trait;
use std::{net::SocketAddr, time::Duration};
use trust_dns_resolver::{
    config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts},
    error::ResolveErrorKind,
    proto::rr::RecordType,
    TokioAsyncResolver,
};

/// One DNS exchange against one resolver
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Send `query` to `server` and wait for its answer.
    ///
    /// `deadline` is the time the transport may spend on the exchange. Callers
    /// still enforce it themselves; implementations use it to size their own
    /// socket timeouts.
    async fn exchange(&self, server: SocketAddr, query: &SampleQuery, deadline: Duration) -> Result<()>;
}

impl From<QueryType> for RecordType {
    fn from(query_type: QueryType) -> Self {
        match query_type {
            QueryType::A => RecordType::A,
            QueryType::AAAA => RecordType::AAAA,
        }
    }
}

/// Transport backed by a single-server `trust-dns` resolver over UDP.
///
/// A fresh resolver is built for every exchange: no cache, no retries, one
/// name server, so every call sends exactly one datagram to the candidate.
#[derive(Debug, Clone, Default)]
pub struct ResolverTransport;

impl ResolverTransport {
    pub fn new() -> Self {
        Self
    }

    fn build_resolver(&self, server: SocketAddr, deadline: Duration) -> TokioAsyncResolver {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(server, Protocol::Udp));

        let mut opts = ResolverOpts::default();
        opts.timeout = deadline;
        // Counts resends after the first try
        opts.attempts = 0;
        opts.cache_size = 0;
        opts.use_hosts_file = false;
        opts.num_concurrent_reqs = 1;

        TokioAsyncResolver::tokio(config, opts)
    }
}

#[async_trait]
impl QueryTransport for ResolverTransport {
    async fn exchange(&self, server: SocketAddr, query: &SampleQuery, deadline: Duration) -> Result<()> {
        let resolver = self.build_resolver(server, deadline);

        match resolver.lookup(query.name.as_str(), query.query_type.into()).await {
            Ok(_) => Ok(()),
            Err(e) => classify_resolve_error(server, query, e.kind()),
        }
    }
}

/// Decide whether a resolver error still counts as a completed exchange.
///
/// NXDOMAIN and empty answers mean the resolver replied; only transport and
/// protocol failures disqualify a candidate.
fn classify_resolve_error(server: SocketAddr, query: &SampleQuery, kind: &ResolveErrorKind) -> Result<()> {
    match kind {
        ResolveErrorKind::NoRecordsFound { .. } => Ok(()),
        ResolveErrorKind::Timeout => Err(AppError::timeout(format!(
            "{} did not answer {} in time",
            server, query
        ))),
        other => Err(AppError::dns_resolution(format!(
            "{} failed to answer {}: {}",
            server, query, other
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use trust_dns_resolver::proto::op::{Query, ResponseCode};

    fn server() -> SocketAddr {
        "192.0.2.1:53".parse().unwrap()
    }

    #[test]
    fn test_record_type_conversion() {
        assert_eq!(RecordType::from(QueryType::A), RecordType::A);
        assert_eq!(RecordType::from(QueryType::AAAA), RecordType::AAAA);
    }

    #[test]
    fn test_no_records_counts_as_answer() {
        let kind = ResolveErrorKind::NoRecordsFound {
            query: Box::new(Query::new()),
            soa: None,
            negative_ttl: None,
            response_code: ResponseCode::NXDomain,
            trusted: false,
        };
        assert!(classify_resolve_error(server(), &SampleQuery::a("example.com"), &kind).is_ok());
    }

    #[test]
    fn test_timeout_is_reported_as_timeout() {
        let error = classify_resolve_error(server(), &SampleQuery::a("example.com"), &ResolveErrorKind::Timeout)
            .unwrap_err();
        assert_eq!(error.category(), "TIMEOUT");
        assert!(error.to_string().contains("192.0.2.1:53"));
    }

    #[test]
    fn test_other_errors_are_dns_failures() {
        let kind = ResolveErrorKind::Message("connection refused");
        let error = classify_resolve_error(server(), &SampleQuery::a("example.com"), &kind).unwrap_err();
        assert_eq!(error.category(), "DNS");
        assert!(error.to_string().contains("example.com."));
    }

    #[tokio::test]
    async fn test_resolver_transport_unreachable_server_fails() {
        // discard port on loopback: the exchange must fail or time out, never succeed
        let transport = ResolverTransport::new();
        let unreachable: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            transport.exchange(unreachable, &SampleQuery::a("example.com"), Duration::from_millis(200)),
        )
        .await;

        match result {
            Ok(exchange) => assert!(exchange.is_err()),
            Err(_) => {} // deadline reached first, also a failure
        }
    }

    #[tokio::test]
    async fn test_silent_server_receives_a_single_datagram() {
        let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server = silent.local_addr().unwrap();

        let result = ResolverTransport::new()
            .exchange(server, &SampleQuery::a("example.com"), Duration::from_millis(200))
            .await;
        assert!(result.is_err());

        // Leave room for a late resend before counting
        tokio::time::sleep(Duration::from_millis(300)).await;
        let mut buf = [0u8; 512];
        let mut received = 0;
        while silent.try_recv_from(&mut buf).is_ok() {
            received += 1;
        }
        assert_eq!(received, 1);
    }
}
