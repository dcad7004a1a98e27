//! Snapshot -> display metrics.
//!
//! Every ratio goes through [`ratio`](super::ratio), so a zero denominator
//! always surfaces as [`MetricValue::Unavailable`].

use super::{percent, ratio, round_half_up, rounded, rounded_2dp};
use crate::models::{Card, MetricValue, Metrics, Snapshot, Yaku};

/// Tenhou's stable rating is the mean rate scaled by 40.
const STABLE_RATE_FACTOR: f64 = 40.0;

fn n(count: u32) -> f64 {
    f64::from(count)
}

fn points(total: i64) -> f64 {
    total as f64
}

/// Derive every display metric from a snapshot.
///
/// Pure and total: the same snapshot always yields the same metrics.
pub fn derive_metrics(c: &Snapshot) -> Metrics {
    Metrics {
        basic: basic(c),
        win_loss: win_loss(c),
        riichi: riichi(c),
        yakus: yakus(c),
    }
}

fn stable_rate(c: &Snapshot) -> MetricValue {
    match ratio(c.tot_rate, c.matches) {
        Some(mean) => MetricValue::Integer(round_half_up(mean * STABLE_RATE_FACTOR) as i64),
        None => MetricValue::Unavailable,
    }
}

fn basic(c: &Snapshot) -> Vec<Card> {
    vec![
        Card::new()
            .with("matches", MetricValue::Count(c.matches))
            .with("rounds", MetricValue::Count(c.rounds))
            .with("stableRate", stable_rate(c))
            .with("roundIo", rounded_2dp(points(c.total_score), c.rounds))
            .with(
                "netIo",
                rounded(points(c.win_score) + points(c.lose_score), c.rounds),
            ),
        Card::new()
            .with("rank1Rate", percent(n(c.rank1), c.matches))
            .with("rank2Rate", percent(n(c.rank2), c.matches))
            .with("rank3Rate", percent(n(c.rank3), c.matches))
            .with("rank4Rate", percent(n(c.rank4), c.matches))
            .with("flyRate", percent(n(c.tobi), c.matches)),
        Card::new()
            .with("winRate", percent(n(c.wins), c.rounds))
            .with("loseRate", percent(n(c.loses), c.rounds))
            .with("drawRate", percent(n(c.draw), c.rounds))
            .with("noChangeRate", percent(n(c.no_change), c.rounds))
            .with("winLossDiff", percent(n(c.wins) - n(c.loses), c.rounds)),
        Card::new()
            .with("riichiRate", percent(n(c.riichi), c.rounds))
            .with("furoRate", percent(n(c.total_furo), c.rounds))
            .with("damaronRate", percent(n(c.win_dama), c.wins))
            .with("drawTenpaiRate", percent(n(c.draw_tenpai), c.draw))
            .with("tsumoRate", percent(n(c.win_tsumo), c.wins)),
    ]
}

fn win_loss(c: &Snapshot) -> Vec<Card> {
    vec![
        Card::new()
            .with("winRate", percent(n(c.wins), c.rounds))
            .with("tsumoRate", percent(n(c.win_tsumo), c.wins))
            .with("ronRate", percent(n(c.win_ron), c.wins))
            .with("winScore", rounded(points(c.win_score), c.wins))
            .with("winJunme", rounded_2dp(n(c.win_total_junme), c.wins)),
        Card::new()
            .with("winRiichiRate", percent(n(c.win_riichi), c.wins))
            .with("winDamaRate", percent(n(c.win_dama), c.wins))
            .with("winFuroRate", percent(n(c.win_furo), c.wins))
            .with("winOyaRate", percent(n(c.win_oya), c.wins))
            .with("winKoRate", percent(n(c.win_ko), c.wins)),
        Card::new()
            .with("loseRate", percent(n(c.loses), c.rounds))
            .with("loseScore", rounded(points(c.lose_score), c.loses))
            .with("loseJunme", rounded_2dp(n(c.lose_total_junme), c.loses))
            .with("loseRiichiRate", percent(n(c.lose_riichi), c.loses))
            .with("loseMenzenRate", percent(n(c.lose_menzen), c.loses))
            .with("loseFuroRate", percent(n(c.lose_furo), c.loses)),
        Card::new()
            .with("loseKoToOyaRate", percent(n(c.lose_ko_to_oya), c.loses))
            .with("loseKoToKoRate", percent(n(c.lose_ko_to_ko), c.loses))
            .with("loseOyaToKoRate", percent(n(c.lose_oya_to_ko), c.loses))
            .with("lossToRiichRate", percent(n(c.lose_to_riichi), c.loses))
            .with("lossToDamaRate", percent(n(c.lose_to_dama), c.loses))
            .with("lossToFuroRate", percent(n(c.lose_to_furo), c.loses)),
        Card::new().with(
            "beTsumoOyaManganRate",
            percent(n(c.be_tsumo_oya_mangan), c.be_tsumo),
        ),
        Card::new().with(
            "beTsumoOyaManganScore",
            rounded(
                points(c.be_tsumo_oya_mangan_total_score),
                c.be_tsumo_oya_mangan,
            ),
        ),
    ]
}

fn riichi(c: &Snapshot) -> Vec<Card> {
    let win_score = c.riichi_win_score as f64;
    let total_score = points(c.riichi_total_score);
    let y = &c.yakus;

    vec![
        Card::new()
            .with("riichRate", percent(n(c.riichi), c.rounds))
            .with("dblRiichiRate", percent(n(c.riichi_double), c.riichi))
            .with("riichScore", rounded(win_score, c.riichi_win))
            .with("riichCost", rounded(total_score - win_score, c.riichi_lose))
            .with("riichIo", rounded(total_score, c.riichi)),
        Card::new()
            .with("riichWinRate", percent(n(c.riichi_win), c.riichi))
            .with("riichLoseRate", percent(n(c.riichi_lose), c.riichi))
            .with("riichBeTsumoRate", percent(n(c.riichi_be_tsumo), c.riichi))
            .with("riichDrawRate", percent(n(c.riichi_draw), c.riichi)),
        Card::new()
            .with("riichFirstRate", percent(n(c.riichi_first), c.riichi))
            .with("riichFollowRate", percent(n(c.riichi_follow), c.riichi))
            .with("riichFollowedRate", percent(n(c.riichi_followed), c.riichi))
            .with("riichJunme", rounded_2dp(n(c.riichi_total_junme), c.riichi)),
        Card::new()
            .with(
                "riichiIppatsuRate",
                percent(n(y.get(Yaku::Ippatsu)), c.riichi_win),
            )
            .with(
                "riichiTsumoRate",
                percent(n(y.get(Yaku::MenzenTsumo)), c.riichi_win),
            )
            .with("riichUra", percent(n(y.get(Yaku::UraDora)), c.riichi_win))
            .with(
                "riichiIppatsuTsumoRate",
                percent(n(c.riichi_ippatsu_tsumo), c.riichi),
            ),
    ]
}

fn yakus(c: &Snapshot) -> Vec<Card> {
    let y = &c.yakus;
    let per_win = |yaku: Yaku| percent(n(y.get(yaku)), c.wins);
    let group_per_win = |group: &[Yaku]| percent(y.sum(group) as f64, c.wins);

    vec![
        Card::new()
            .with("menzeTsumo", per_win(Yaku::MenzenTsumo))
            .with("riichi", per_win(Yaku::Riichi))
            .with("ippatsu", per_win(Yaku::Ippatsu))
            .with("pinfu", per_win(Yaku::Pinfu))
            .with("tanyao", per_win(Yaku::Tanyao)),
        Card::new()
            .with("jikaze", group_per_win(&Yaku::JIKAZE))
            .with("bakaze", group_per_win(&Yaku::BAKAZE))
            .with("yakuhai", group_per_win(&Yaku::SANGENPAI))
            .with("dora", per_win(Yaku::Dora))
            .with("uraDora", per_win(Yaku::UraDora))
            .with("akaDora", per_win(Yaku::AkaDora)),
        Card::new()
            .with("chiitoi", per_win(Yaku::Chiitoitsu))
            .with("toitoi", per_win(Yaku::Toitoi))
            .with("honitsu", per_win(Yaku::Honitsu))
            .with("chinitsu", per_win(Yaku::Chinitsu)),
        Card::new()
            .with("ippeiko", per_win(Yaku::Iipeikou))
            .with("chanta", per_win(Yaku::Chanta))
            .with("ittsu", per_win(Yaku::Ittsu))
            .with("sanshoku", per_win(Yaku::SanshokuDoujun))
            .with("junchan", per_win(Yaku::Junchan)),
    ]
}
