use chrono::Utc;
use rand::Rng;
use std::sync::Mutex;

/// Modified base64 alphabet ordered by ASCII value, so the generated ids sort
/// lexicographically in generation order.
const PUSH_CHARS: &[u8; 64] =
    b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Generates the 20-character child keys the store hands out for new records:
/// 8 characters encode the creation time in milliseconds, 12 are random.
/// Ids allocated within the same millisecond reuse the previous random suffix
/// incremented by one, which keeps them unique and still sortable.
pub struct PushIdGenerator {
    state: Mutex<State>,
}

struct State {
    last_ms: i64,
    suffix: [usize; 12],
}

impl PushIdGenerator {
    pub fn new() -> Self {
        PushIdGenerator {
            state: Mutex::new(State {
                last_ms: 0,
                suffix: [0; 12],
            }),
        }
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut state = self.state.lock().expect("push id state lock poisoned");

        if now == state.last_ms {
            for slot in state.suffix.iter_mut().rev() {
                if *slot == 63 {
                    *slot = 0;
                } else {
                    *slot += 1;
                    break;
                }
            }
        } else {
            state.last_ms = now;
            let mut rng = rand::thread_rng();
            for slot in state.suffix.iter_mut() {
                *slot = rng.gen_range(0..64);
            }
        }

        let mut head = [0u8; 8];
        let mut ms = now;
        for slot in head.iter_mut().rev() {
            *slot = PUSH_CHARS[(ms % 64) as usize];
            ms /= 64;
        }

        let mut id = String::with_capacity(20);
        id.extend(head.iter().map(|&b| b as char));
        id.extend(state.suffix.iter().map(|&i| PUSH_CHARS[i] as char));
        id
    }
}

impl Default for PushIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
