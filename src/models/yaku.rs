//! Scoring-pattern (yaku) catalog and per-pattern occurrence counts.
//!
//! The external log parser reports yaku counts as a flat array whose
//! positions follow the Tenhou yaku table. That positional encoding is kept
//! at the serde boundary only; everything else addresses counts by [`Yaku`].

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Named scoring patterns, declared in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Yaku {
    MenzenTsumo,
    Riichi,
    Ippatsu,
    Chankan,
    RinshanKaihou,
    HaiteiRaoyue,
    HouteiRaoyui,
    Pinfu,
    Tanyao,
    Iipeikou,
    JikazeTon,
    JikazeNan,
    JikazeShaa,
    JikazePei,
    BakazeTon,
    BakazeNan,
    BakazeShaa,
    BakazePei,
    Haku,
    Hatsu,
    Chun,
    DoubleRiichi,
    Chiitoitsu,
    Chanta,
    Ittsu,
    SanshokuDoujun,
    SanshokuDoukou,
    Sankantsu,
    Toitoi,
    Sanankou,
    Shousangen,
    Honroutou,
    Ryanpeikou,
    Junchan,
    Honitsu,
    Chinitsu,
    Renhou,
    Tenhou,
    Chiihou,
    Daisangen,
    Suuankou,
    SuuankouTanki,
    Tsuuiisou,
    Ryuuiisou,
    Chinroutou,
    ChuurenPoutou,
    JunseiChuurenPoutou,
    KokushiMusou,
    KokushiMusou13Wait,
    Daisuushii,
    Shousuushii,
    Suukantsu,
    Dora,
    UraDora,
    AkaDora,
}

impl Yaku {
    /// Number of slots in the wire array.
    pub const COUNT: usize = 55;

    /// Every yaku, in wire order. `ALL[i].wire_index() == i`.
    pub const ALL: [Yaku; Yaku::COUNT] = [
        Yaku::MenzenTsumo,
        Yaku::Riichi,
        Yaku::Ippatsu,
        Yaku::Chankan,
        Yaku::RinshanKaihou,
        Yaku::HaiteiRaoyue,
        Yaku::HouteiRaoyui,
        Yaku::Pinfu,
        Yaku::Tanyao,
        Yaku::Iipeikou,
        Yaku::JikazeTon,
        Yaku::JikazeNan,
        Yaku::JikazeShaa,
        Yaku::JikazePei,
        Yaku::BakazeTon,
        Yaku::BakazeNan,
        Yaku::BakazeShaa,
        Yaku::BakazePei,
        Yaku::Haku,
        Yaku::Hatsu,
        Yaku::Chun,
        Yaku::DoubleRiichi,
        Yaku::Chiitoitsu,
        Yaku::Chanta,
        Yaku::Ittsu,
        Yaku::SanshokuDoujun,
        Yaku::SanshokuDoukou,
        Yaku::Sankantsu,
        Yaku::Toitoi,
        Yaku::Sanankou,
        Yaku::Shousangen,
        Yaku::Honroutou,
        Yaku::Ryanpeikou,
        Yaku::Junchan,
        Yaku::Honitsu,
        Yaku::Chinitsu,
        Yaku::Renhou,
        Yaku::Tenhou,
        Yaku::Chiihou,
        Yaku::Daisangen,
        Yaku::Suuankou,
        Yaku::SuuankouTanki,
        Yaku::Tsuuiisou,
        Yaku::Ryuuiisou,
        Yaku::Chinroutou,
        Yaku::ChuurenPoutou,
        Yaku::JunseiChuurenPoutou,
        Yaku::KokushiMusou,
        Yaku::KokushiMusou13Wait,
        Yaku::Daisuushii,
        Yaku::Shousuushii,
        Yaku::Suukantsu,
        Yaku::Dora,
        Yaku::UraDora,
        Yaku::AkaDora,
    ];

    /// Seat-wind yakuhai.
    pub const JIKAZE: [Yaku; 4] = [
        Yaku::JikazeTon,
        Yaku::JikazeNan,
        Yaku::JikazeShaa,
        Yaku::JikazePei,
    ];

    /// Round-wind yakuhai.
    pub const BAKAZE: [Yaku; 4] = [
        Yaku::BakazeTon,
        Yaku::BakazeNan,
        Yaku::BakazeShaa,
        Yaku::BakazePei,
    ];

    /// Dragon yakuhai.
    pub const SANGENPAI: [Yaku; 3] = [Yaku::Haku, Yaku::Hatsu, Yaku::Chun];

    /// Position of this yaku in the parser's count array.
    pub fn wire_index(self) -> usize {
        self as usize
    }

    /// Yaku at the given wire position, if any.
    pub fn from_wire_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

}

impl fmt::Display for Yaku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Occurrence count per yaku.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YakuCounts {
    counts: [u32; Yaku::COUNT],
}

impl Default for YakuCounts {
    fn default() -> Self {
        Self {
            counts: [0; Yaku::COUNT],
        }
    }
}

impl YakuCounts {
    /// Empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count recorded for `yaku`.
    pub fn get(&self, yaku: Yaku) -> u32 {
        self.counts[yaku.wire_index()]
    }

    /// Set the count for `yaku`.
    pub fn set(&mut self, yaku: Yaku, count: u32) {
        self.counts[yaku.wire_index()] = count;
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, yaku: Yaku, count: u32) -> Self {
        self.set(yaku, count);
        self
    }

    /// Summed count over a group of yaku (e.g. all seat winds).
    pub fn sum(&self, group: &[Yaku]) -> u64 {
        group.iter().map(|&y| u64::from(self.get(y))).sum()
    }

    /// Non-zero entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Yaku, u32)> + '_ {
        Yaku::ALL
            .iter()
            .map(|&y| (y, self.get(y)))
            .filter(|(_, c)| *c > 0)
    }

    /// Encode into the parser's positional layout.
    pub fn to_wire(&self) -> [u32; Yaku::COUNT] {
        let mut wire = [0u32; Yaku::COUNT];
        for yaku in Yaku::ALL {
            wire[yaku.wire_index()] = self.get(yaku);
        }
        wire
    }

    /// Decode from the parser's positional layout.
    pub fn from_wire(wire: &[u32]) -> Result<Self, YakuWireError> {
        if wire.len() != Yaku::COUNT {
            return Err(YakuWireError::Length(wire.len()));
        }
        let mut counts = Self::new();
        for (index, &count) in wire.iter().enumerate() {
            let yaku = Yaku::from_wire_index(index).ok_or(YakuWireError::Length(wire.len()))?;
            counts.set(yaku, count);
        }
        Ok(counts)
    }
}

/// Malformed yaku array on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum YakuWireError {
    #[error("expected {} yaku counts, got {0}", Yaku::COUNT)]
    Length(usize),
}

impl Serialize for YakuCounts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = self.to_wire();
        let mut seq = serializer.serialize_seq(Some(wire.len()))?;
        for count in wire {
            seq.serialize_element(&count)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for YakuCounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WireVisitor;

        impl<'de> Visitor<'de> for WireVisitor {
            type Value = YakuCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an array of {} non-negative yaku counts", Yaku::COUNT)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<YakuCounts, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut wire = [0u32; Yaku::COUNT];
                let mut len = 0;
                while let Some(count) = seq.next_element::<u32>()? {
                    if len == Yaku::COUNT {
                        return Err(de::Error::invalid_length(len + 1, &self));
                    }
                    wire[len] = count;
                    len += 1;
                }
                YakuCounts::from_wire(&wire[..len]).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(WireVisitor)
    }
}
