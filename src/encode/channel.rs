use alloc::vec::Vec;

use super::EncodeError;
use crate::{message::Channel, tree::Instrument};

/// Channels handed to melodic instruments, in order. The percussion channel is skipped.
const MELODIC_CHANNELS: [Channel; 15] = [
    Channel::One,
    Channel::Two,
    Channel::Three,
    Channel::Four,
    Channel::Five,
    Channel::Six,
    Channel::Seven,
    Channel::Eight,
    Channel::Nine,
    Channel::Eleven,
    Channel::Twelve,
    Channel::Thirteen,
    Channel::Fourteen,
    Channel::Fifteen,
    Channel::Sixteen,
];

#[doc = r#"
Which channel each instrument plays on.

Every percussion instrument shares the percussion channel, whose program is
taken from the first percussion instrument seen. Every other instrument,
including "no instrument", gets a channel of its own in order of first
appearance.

```rust
# use musemidi::{encode::ChannelMap, message::Channel, tree::Instrument};
let piano = Some(Instrument::new(0).unwrap());
let bass = Some(Instrument::new(33).unwrap());
let map = ChannelMap::assign([piano, Some(Instrument::DRUMS), bass, piano]).unwrap();

assert_eq!(map.channel(piano), Some(Channel::One));
assert_eq!(map.channel(Some(Instrument::DRUMS)), Some(Channel::Ten));
assert_eq!(map.channel(bass), Some(Channel::Two));
```
"#]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMap {
    assignments: Vec<(Option<Instrument>, Channel)>,
    percussion_program: Option<u8>,
}

impl ChannelMap {
    /// Assign channels to instruments in the order given. Repeats are ignored.
    ///
    /// # Errors
    /// if more than fifteen distinct non-percussion instruments are given
    pub fn assign<I>(instruments: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = Option<Instrument>>,
    {
        let mut map = Self::default();
        let mut free = MELODIC_CHANNELS.iter().copied();
        let mut overflow = Vec::new();

        for key in instruments {
            if map.channel(key).is_some() || overflow.contains(&key) {
                continue;
            }
            let channel = match key {
                Some(instrument) if instrument.is_percussion() => {
                    map.percussion_program.get_or_insert(instrument.patch());
                    Channel::PERCUSSION
                }
                _ => match free.next() {
                    Some(channel) => channel,
                    None => {
                        overflow.push(key);
                        continue;
                    }
                },
            };
            #[cfg(feature = "tracing")]
            tracing::debug!("Assigned {channel:?} to {key:?}");
            map.assignments.push((key, channel));
        }

        if !overflow.is_empty() {
            return Err(EncodeError::TooManyInstruments {
                count: MELODIC_CHANNELS.len() + overflow.len(),
            });
        }
        Ok(map)
    }

    /// The channel of an instrument
    pub fn channel(&self, instrument: Option<Instrument>) -> Option<Channel> {
        self.assignments
            .iter()
            .find(|(key, _)| *key == instrument)
            .map(|(_, channel)| *channel)
    }

    /// The program change to send on a channel, if any
    pub fn program(&self, channel: Channel) -> Option<u8> {
        if channel.is_percussion() {
            return self.percussion_program;
        }
        self.assignments
            .iter()
            .find(|(_, c)| *c == channel)
            .and_then(|(key, _)| key.map(|i| i.patch()))
    }

    /// The channels in use, ascending
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self.assignments.iter().map(|(_, c)| *c).collect();
        channels.sort();
        channels.dedup();
        channels
    }
}
