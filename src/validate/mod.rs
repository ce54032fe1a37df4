mod autocorr;
mod score;
mod vif;

pub use autocorr::{
    AutocorrelationReport, MoranPermutationTest, MoranTest, ResidualPoint, dedupe_residuals,
    moran_permutation_test, moran_test, test_deduplicated, test_residual_autocorrelation,
};
pub use score::{MadScores, VariantScore, mad_scores, score_variants};
pub use vif::{
    CovariateMatrix, VIF_THRESHOLD, Vif, VifResolution, VifResolver, VifStep, variance_inflation,
};
