use crate::{RunContext, ValueSink};
use crossbeam_channel::{Sender, select};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Emits `1, 2, 3, ...` into `tx` until `ctx` is done, then closes `tx`.
///
/// Each emission races the send against the context's deadline and cancel
/// signal. When several are ready at once the winner is picked at random, so a
/// run may produce one value more or less than a strict deadline would allow.
/// Either way `sink` hears about a value if and only if the value was
/// accepted by `tx`.
///
/// The loop also stops if every receiver of `tx` is gone; the value that could
/// not be sent is not reported. Returns the number of values emitted.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn generate<S>(ctx: &RunContext, tx: Sender<i64>, sink: &S) -> i64
where
    S: ValueSink + ?Sized,
{
    let mut next: i64 = 1;

    loop {
        select! {
            recv(ctx.cancelled()) -> _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Generator cancelled");
                break;
            }
            recv(ctx.deadline()) -> _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Generator deadline reached");
                break;
            }
            send(tx, next) -> res => {
                if res.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Input queue disconnected, stopping at {next}");
                    break;
                }
                sink.on_value_produced(next);
                next += 1;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Generator produced {} values", next - 1);

    // Dropping the sender here closes the input queue.
    drop(tx);
    next - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Accountant, Totals};
    use crossbeam_channel::bounded;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn emits_contiguous_values_until_cancelled() {
        let (ctx, canceller) = RunContext::without_deadline();
        let (tx, rx) = bounded(16);
        let accountant = Arc::new(Accountant::new());

        let generator = {
            let accountant = Arc::clone(&accountant);
            thread::spawn(move || generate(&ctx, tx, &*accountant))
        };

        let mut seen = Vec::new();
        for _ in 0..100 {
            seen.push(rx.recv().unwrap());
        }
        canceller.cancel();
        let produced = generator.join().unwrap();

        // Drain whatever was buffered before the cancel won the race.
        seen.extend(rx.iter());

        assert_eq!(seen.len() as i64, produced);
        assert!(seen.iter().copied().eq(1..=produced));
        assert_eq!(
            accountant.totals().unwrap(),
            seen.iter().copied().collect::<Totals>()
        );
    }

    #[test]
    fn closes_queue_on_deadline() {
        let (ctx, _canceller) = RunContext::with_timeout(Duration::from_millis(20));
        let (tx, rx) = bounded(0);
        let accountant = Accountant::new();

        thread::scope(|s| {
            s.spawn(|| generate(&ctx, tx, &accountant));
            let received: Totals = rx.iter().collect();
            assert_eq!(received, accountant.totals().unwrap());
            assert_eq!(received.sum, received.gauss_sum());
        });
    }

    #[test]
    fn expired_context_accounts_only_enqueued_values() {
        // With a rendezvous queue and no receiver, nothing can be accepted.
        let (ctx, _canceller) = RunContext::with_timeout(Duration::ZERO);
        let (tx, _rx) = bounded(0);
        let accountant = Accountant::new();

        assert_eq!(generate(&ctx, tx, &accountant), 0);
        assert_eq!(accountant.totals().unwrap(), Totals::default());
    }

    #[test]
    fn stops_when_receiver_is_dropped() {
        let (ctx, _canceller) = RunContext::without_deadline();
        let (tx, rx) = bounded(4);
        drop(rx);
        let accountant = Accountant::new();

        assert_eq!(generate(&ctx, tx, &accountant), 0);
        assert_eq!(accountant.totals().unwrap().count, 0);
    }
}
