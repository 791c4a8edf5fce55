// src/query/transport.rs
use std::net::SocketAddr;
use std::time::Duration;
use log::{debug, trace};
use tokio::net::UdpSocket;
use crate::error::QueryError;
use crate::models::server::{PlayerRecord, RuleSet};
use crate::query::codec::{self, QueryKind, Reply};
use crate::utils::{local_bind_addr, QueryTarget};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

const RECV_BUFFER_LEN: usize = 4096;

/// Result of one exchange that did not fail at the socket level.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    Answered(T),
    /// No datagram arrived within the timeout.
    TimedOut,
    /// A datagram arrived but was not the reply kind that was asked for.
    Mismatched,
}

impl<T: Default> QueryOutcome<T> {
    /// Timeouts and mismatches both read as "no data".
    pub fn into_data(self) -> T {
        match self {
            Self::Answered(data) => data,
            Self::TimedOut | Self::Mismatched => T::default(),
        }
    }
}

pub async fn query_rules(
    target: &QueryTarget,
    timeout: Duration,
) -> Result<QueryOutcome<RuleSet>, QueryError> {
    let outcome = exchange(target, QueryKind::Rules, timeout).await?;
    Ok(map_answer(outcome, |datagram| match codec::classify(datagram) {
        Reply::Rules(payload) => codec::decode_rules(payload),
        _ => RuleSet::new(),
    }))
}

pub async fn query_players(
    target: &QueryTarget,
    timeout: Duration,
) -> Result<QueryOutcome<Vec<PlayerRecord>>, QueryError> {
    let outcome = exchange(target, QueryKind::Players, timeout).await?;
    Ok(map_answer(outcome, |datagram| match codec::classify(datagram) {
        Reply::Players(payload) => codec::decode_players(payload),
        _ => Vec::new(),
    }))
}

fn map_answer<T>(outcome: QueryOutcome<Vec<u8>>, decode: impl FnOnce(&[u8]) -> T) -> QueryOutcome<T> {
    match outcome {
        QueryOutcome::Answered(datagram) => QueryOutcome::Answered(decode(&datagram)),
        QueryOutcome::TimedOut => QueryOutcome::TimedOut,
        QueryOutcome::Mismatched => QueryOutcome::Mismatched,
    }
}

/// Runs one request, answering at most one challenge, on a socket owned by
/// this call. Yields the raw datagram only when it is the expected reply.
async fn exchange(
    target: &QueryTarget,
    kind: QueryKind,
    timeout: Duration,
) -> Result<QueryOutcome<Vec<u8>>, QueryError> {
    let server_addr = target.resolve().await?;
    let socket = UdpSocket::bind(local_bind_addr(&server_addr)).await?;

    send(&socket, server_addr, &codec::encode_request(kind, None)).await?;
    let Some(mut datagram) = receive(&socket, timeout).await? else {
        debug!("Timed out waiting for {} reply from {}", kind.name(), target);
        return Ok(QueryOutcome::TimedOut);
    };

    let challenge = match codec::classify(&datagram) {
        Reply::Challenge(challenge) => Some(challenge.to_vec()),
        _ => None,
    };
    if let Some(challenge) = challenge {
        trace!("Received challenge {:02X?} from {}", challenge, target);
        let retry = codec::encode_request(kind, Some(&challenge));
        send(&socket, server_addr, &retry).await?;
        match receive(&socket, timeout).await? {
            Some(reply) => datagram = reply,
            None => {
                debug!("Timed out waiting for challenged {} reply from {}", kind.name(), target);
                return Ok(QueryOutcome::TimedOut);
            }
        }
    }

    if !codec::classify(&datagram).answers(kind) {
        debug!(
            "Unexpected reply to {} query from {} ({} bytes)",
            kind.name(),
            target,
            datagram.len()
        );
        return Ok(QueryOutcome::Mismatched);
    }

    trace!("Received {} reply from {} with {} bytes", kind.name(), target, datagram.len());
    Ok(QueryOutcome::Answered(datagram))
}

async fn send(socket: &UdpSocket, server_addr: SocketAddr, packet: &[u8]) -> Result<(), QueryError> {
    socket.send_to(packet, server_addr).await?;
    trace!("Sent {:02X?} to {}", packet, server_addr);
    Ok(())
}

async fn receive(socket: &UdpSocket, timeout: Duration) -> Result<Option<Vec<u8>>, QueryError> {
    let mut buffer = [0u8; RECV_BUFFER_LEN];
    match tokio::time::timeout(timeout, socket.recv_from(&mut buffer)).await {
        Ok(Ok((len, _addr))) => Ok(Some(buffer[..len].to_vec())),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket as StdUdpSocket;
    use std::thread;

    fn target_for(socket: &StdUdpSocket) -> QueryTarget {
        let addr = socket.local_addr().unwrap();
        QueryTarget { host: addr.ip().to_string(), port: addr.port() }
    }

    #[test]
    fn timed_out_and_mismatched_read_as_empty() {
        assert!(QueryOutcome::<RuleSet>::TimedOut.into_data().is_empty());
        assert!(QueryOutcome::<Vec<PlayerRecord>>::Mismatched.into_data().is_empty());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let outcome = query_rules(&target_for(&server), Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(outcome, QueryOutcome::TimedOut);
    }

    #[tokio::test]
    async fn unchallenged_reply_is_answered() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let target = target_for(&server);
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let mut requests = Vec::new();
            let (len, client) = server.recv_from(&mut buf).unwrap();
            requests.push(buf[..len].to_vec());

            let mut reply = vec![0xFF, 0xFF, 0xFF, 0xFF, b'E', 0, 0];
            reply.extend_from_slice(b"sv_hostname\0Direct\0mapname\0toxicity\0");
            server.send_to(&reply, client).unwrap();

            // nothing else should arrive
            while let Ok((len, _)) = server.recv_from(&mut buf) {
                requests.push(buf[..len].to_vec());
            }
            requests
        });

        let outcome = query_rules(&target, Duration::from_secs(2)).await.unwrap();
        let requests = handle.join().unwrap();

        let rules = match outcome {
            QueryOutcome::Answered(rules) => rules,
            other => panic!("expected an answer, got {:?}", other),
        };
        assert_eq!(rules["sv_hostname"], "Direct");
        assert_eq!(rules["mapname"], "toxicity");
        assert_eq!(requests, vec![codec::encode_rules_request(None)]);
    }

    #[tokio::test]
    async fn wrong_reply_kind_is_mismatch() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let target = target_for(&server);
        thread::spawn(move || {
            let mut buf = [0u8; 64];
            if let Ok((_, client)) = server.recv_from(&mut buf) {
                let _ = server.send_to(&[0xFF, 0xFF, 0xFF, 0xFF, b'D', 0], client);
            }
        });

        let outcome = query_rules(&target, Duration::from_secs(2)).await.unwrap();
        assert_eq!(outcome, QueryOutcome::Mismatched);
    }

    #[tokio::test]
    async fn answers_one_challenge() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let target = target_for(&server);
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let mut requests = Vec::new();

            let (len, client) = server.recv_from(&mut buf).unwrap();
            requests.push(buf[..len].to_vec());
            server.send_to(&[0xFF, 0xFF, 0xFF, 0xFF, b'A', 9, 8, 7, 6], client).unwrap();

            let (len, client) = server.recv_from(&mut buf).unwrap();
            requests.push(buf[..len].to_vec());
            let mut reply = vec![0xFF, 0xFF, 0xFF, 0xFF, b'D', 1, 0];
            reply.extend_from_slice(b"anarki\0");
            reply.extend_from_slice(&5i32.to_le_bytes());
            reply.extend_from_slice(&12.5f32.to_le_bytes());
            server.send_to(&reply, client).unwrap();
            requests
        });

        let players = query_players(&target, Duration::from_secs(2))
            .await
            .unwrap()
            .into_data();
        let requests = handle.join().unwrap();

        assert_eq!(requests[0], codec::encode_players_request(None));
        assert_eq!(requests[1], codec::encode_players_request(Some(&[9, 8, 7, 6])));
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "anarki");
        assert_eq!(players[0].score, 5);
    }

    #[tokio::test]
    async fn second_challenge_is_not_answered() {
        let server = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let target = target_for(&server);
        thread::spawn(move || {
            let mut buf = [0u8; 64];
            for _ in 0..2 {
                if let Ok((_, client)) = server.recv_from(&mut buf) {
                    let _ = server.send_to(&[0xFF, 0xFF, 0xFF, 0xFF, b'A', 1, 1, 1, 1], client);
                }
            }
        });

        let outcome = query_rules(&target, Duration::from_secs(2)).await.unwrap();
        assert_eq!(outcome, QueryOutcome::Mismatched);
    }

    #[tokio::test]
    async fn unresolvable_host_is_an_error() {
        let target = QueryTarget { host: "host.invalid".to_string(), port: 27960 };
        let err = query_rules(&target, Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, QueryError::Unresolved(_)));
    }
}
