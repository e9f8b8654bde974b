mod ranking;
mod report;
mod separation;

pub use ranking::{
    evaluate_record, rank_candidates, Candidate, Evaluation, ObservationEvent, Ranking,
    RankingOptions, SkipReason,
};
pub use report::{write_ranking, write_rejected, write_subpoints};
pub use separation::{angular_separation, SkyDirection};
