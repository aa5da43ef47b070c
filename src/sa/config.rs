//! SA configuration, candidate-generation modes and option parsing.

use std::collections::HashMap;

use super::error::SaError;

/// Default growth-rate parameter for adaptive candidate generation.
pub const DEFAULT_BETA: f64 = 0.11;

/// Default step-growth parameter for adaptive candidate generation.
pub const DEFAULT_XI: f64 = 3.0;

/// Which way the objective is optimized.
///
/// `Maximize` is the historical convention of the named-option interface:
/// candidates with a *higher* cost are always accepted. Callers that want
/// to minimize either pick `Minimize` or negate their cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Higher cost is better.
    #[default]
    Maximize,
    /// Lower cost is better.
    Minimize,
}

impl Direction {
    /// Signed gain of moving from `current` to `candidate`.
    ///
    /// Positive when the candidate is better.
    pub fn gain(self, current: f64, candidate: f64) -> f64 {
        match self {
            Direction::Maximize => candidate - current,
            Direction::Minimize => current - candidate,
        }
    }

    /// Returns `true` if `candidate` strictly improves on `best`.
    pub fn improves(self, candidate: f64, best: f64) -> bool {
        match self {
            Direction::Maximize => candidate > best,
            Direction::Minimize => candidate < best,
        }
    }
}

/// How candidate states are generated from the current state.
///
/// # References
///
/// - Vanderbilt & Louie (1984), "A Monte Carlo simulated annealing approach
///   to optimization over continuous variables"
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CandidateGeneration {
    /// Unbiased random step: `x' = x + s * d`.
    #[default]
    Isotropic,

    /// Step reshaped by the scaled Cholesky factor of the covariance of the
    /// states visited at the previous temperature: `x' = x + s * (A * d)`.
    Adaptive {
        /// Growth rate. Typical value: 0.11.
        beta: f64,
        /// Step growth. Typical value: 3.0.
        xi: f64,
    },
}

impl CandidateGeneration {
    /// Adaptive generation with the default `beta` and `xi`.
    pub fn adaptive() -> Self {
        CandidateGeneration::Adaptive {
            beta: DEFAULT_BETA,
            xi: DEFAULT_XI,
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, CandidateGeneration::Adaptive { .. })
    }
}

/// Configuration for the annealing optimizer.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{CandidateGeneration, SaConfig};
///
/// let config = SaConfig::default()
///     .with_seed(7)
///     .with_initial_temperature(10.0)
///     .with_cooling_factor(0.95)
///     .with_num_cost_samples(50)
///     .with_generation(CandidateGeneration::adaptive());
/// assert!(config.validate().is_ok());
/// ```
///
/// Named options, as read from a parameter file by the caller:
///
/// ```
/// use std::collections::HashMap;
/// use u_anneal::sa::SaConfig;
///
/// let params: HashMap<String, f64> = [
///     ("seed", 42.0),
///     ("maxCoolingIterations", 1000.0),
///     ("numCostSamples", 10.0),
///     ("initialTemperature", 1.0),
///     ("coolingFactor", 0.98),
///     ("stepLengthFactor", 0.1),
/// ]
/// .into_iter()
/// .map(|(k, v)| (k.to_string(), v))
/// .collect();
///
/// let config = SaConfig::from_params(&params).unwrap();
/// assert_eq!(config.num_cost_samples, 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Seed of the pseudo-random generator.
    pub seed: u64,

    /// Upper bound on cooling steps.
    ///
    /// Isotropic mode cools after every sample, so this bounds the number of
    /// candidate evaluations; adaptive mode cools once per temperature level.
    pub max_cooling_iterations: usize,

    /// Number of candidates evaluated per temperature level.
    pub num_cost_samples: usize,

    /// Relative spread between mean and minimum sampled cost below which
    /// the run is considered converged.
    pub convergence_relative_tolerance: f64,

    /// Starting temperature. Higher values accept worse moves more often.
    pub initial_temperature: f64,

    /// Exponential cooling factor in (0, 1]: `T_{k+1} = factor * T_k`.
    pub cooling_factor: f64,

    /// Scale applied to every random step.
    pub step_length_factor: f64,

    /// Candidate generation mode.
    pub generation: CandidateGeneration,

    /// Optimization direction.
    pub direction: Direction,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_cooling_iterations: 10_000,
            num_cost_samples: 100,
            convergence_relative_tolerance: f64::EPSILON.sqrt(),
            initial_temperature: 1.0,
            cooling_factor: 0.95,
            step_length_factor: 1.0,
            generation: CandidateGeneration::Isotropic,
            direction: Direction::Maximize,
        }
    }
}

/// Canonical option name and its legacy `sa`-prefixed spelling.
struct ParamKey {
    name: &'static str,
    alias: &'static str,
}

const SEED: ParamKey = ParamKey {
    name: "seed",
    alias: "saSeed",
};
const MAX_COOLING_ITERATIONS: ParamKey = ParamKey {
    name: "maxCoolingIterations",
    alias: "saMaxCoolingIter",
};
const NUM_COST_SAMPLES: ParamKey = ParamKey {
    name: "numCostSamples",
    alias: "saNumCostSamples",
};
const CONVERGENCE_RELATIVE_TOLERANCE: ParamKey = ParamKey {
    name: "convergenceRelativeTolerance",
    alias: "saConvRelTol",
};
const INITIAL_TEMPERATURE: ParamKey = ParamKey {
    name: "initialTemperature",
    alias: "saInitTemp",
};
const COOLING_FACTOR: ParamKey = ParamKey {
    name: "coolingFactor",
    alias: "saCoolingFactor",
};
const STEP_LENGTH_FACTOR: ParamKey = ParamKey {
    name: "stepLengthFactor",
    alias: "saStepLengthFactor",
};
const USE_ADAPTIVE: ParamKey = ParamKey {
    name: "useAdaptiveCandidateGeneration",
    alias: "saUseAdaptiveCandidateGeneration",
};
const BETA: ParamKey = ParamKey {
    name: "beta",
    alias: "saBeta",
};
const XI: ParamKey = ParamKey {
    name: "xi",
    alias: "saXi",
};

fn lookup(params: &HashMap<String, f64>, key: &ParamKey) -> Option<f64> {
    params
        .get(key.name)
        .or_else(|| params.get(key.alias))
        .copied()
}

fn require(params: &HashMap<String, f64>, key: &ParamKey) -> Result<f64, SaError> {
    lookup(params, key).ok_or(SaError::MissingParameter(key.name))
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> SaError {
    SaError::InvalidParameter {
        name,
        value,
        reason,
    }
}

fn to_count(name: &'static str, value: f64) -> Result<usize, SaError> {
    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 || value >= usize::MAX as f64 {
        return Err(invalid(name, value, "must be a positive integer"));
    }
    Ok(value as usize)
}

fn to_seed(value: f64) -> Result<u64, SaError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(invalid(SEED.name, value, "must be a non-negative integer"));
    }
    Ok(value as u64)
}

impl SaConfig {
    /// Builds a configuration from named options.
    ///
    /// Recognized names are `seed`, `maxCoolingIterations`, `numCostSamples`,
    /// `convergenceRelativeTolerance`, `initialTemperature`, `coolingFactor`,
    /// `stepLengthFactor`, `useAdaptiveCandidateGeneration`, `beta` and `xi`;
    /// each also accepts its legacy `sa`-prefixed spelling (`saSeed`,
    /// `saMaxCoolingIter`, `saConvRelTol`, ...). Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// [`SaError::MissingParameter`] if an option without a default is
    /// absent, [`SaError::InvalidParameter`] if any value is out of range.
    pub fn from_params(params: &HashMap<String, f64>) -> Result<Self, SaError> {
        let seed = to_seed(require(params, &SEED)?)?;
        let max_cooling_iterations = to_count(
            MAX_COOLING_ITERATIONS.name,
            require(params, &MAX_COOLING_ITERATIONS)?,
        )?;
        let num_cost_samples =
            to_count(NUM_COST_SAMPLES.name, require(params, &NUM_COST_SAMPLES)?)?;
        let convergence_relative_tolerance = lookup(params, &CONVERGENCE_RELATIVE_TOLERANCE)
            .unwrap_or_else(|| f64::EPSILON.sqrt());
        let initial_temperature = require(params, &INITIAL_TEMPERATURE)?;
        let cooling_factor = require(params, &COOLING_FACTOR)?;
        let step_length_factor = require(params, &STEP_LENGTH_FACTOR)?;

        let generation = match lookup(params, &USE_ADAPTIVE) {
            None => CandidateGeneration::Isotropic,
            Some(v) if v == 0.0 => CandidateGeneration::Isotropic,
            Some(v) if v == 1.0 => CandidateGeneration::Adaptive {
                beta: lookup(params, &BETA).unwrap_or(DEFAULT_BETA),
                xi: lookup(params, &XI).unwrap_or(DEFAULT_XI),
            },
            Some(v) => return Err(invalid(USE_ADAPTIVE.name, v, "may only be 0 or 1")),
        };

        let config = Self {
            seed,
            max_cooling_iterations,
            num_cost_samples,
            convergence_relative_tolerance,
            initial_temperature,
            cooling_factor,
            step_length_factor,
            generation,
            direction: Direction::Maximize,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_cooling_iterations(mut self, n: usize) -> Self {
        self.max_cooling_iterations = n;
        self
    }

    pub fn with_num_cost_samples(mut self, n: usize) -> Self {
        self.num_cost_samples = n;
        self
    }

    pub fn with_convergence_relative_tolerance(mut self, tol: f64) -> Self {
        self.convergence_relative_tolerance = tol;
        self
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_factor(mut self, factor: f64) -> Self {
        self.cooling_factor = factor;
        self
    }

    pub fn with_step_length_factor(mut self, factor: f64) -> Self {
        self.step_length_factor = factor;
        self
    }

    pub fn with_generation(mut self, generation: CandidateGeneration) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SaError> {
        if self.max_cooling_iterations == 0 {
            return Err(invalid(
                MAX_COOLING_ITERATIONS.name,
                0.0,
                "must be a positive integer",
            ));
        }
        if self.num_cost_samples == 0 {
            return Err(invalid(
                NUM_COST_SAMPLES.name,
                0.0,
                "must be a positive integer",
            ));
        }
        let tol = self.convergence_relative_tolerance;
        if !tol.is_finite() || tol < 0.0 {
            return Err(invalid(
                CONVERGENCE_RELATIVE_TOLERANCE.name,
                tol,
                "must be finite and non-negative",
            ));
        }
        let t = self.initial_temperature;
        if !t.is_finite() || t <= 0.0 {
            return Err(invalid(
                INITIAL_TEMPERATURE.name,
                t,
                "must be finite and positive",
            ));
        }
        let alpha = self.cooling_factor;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(invalid(COOLING_FACTOR.name, alpha, "must be in (0, 1]"));
        }
        let s = self.step_length_factor;
        if !s.is_finite() || s <= 0.0 {
            return Err(invalid(
                STEP_LENGTH_FACTOR.name,
                s,
                "must be finite and positive",
            ));
        }
        if let CandidateGeneration::Adaptive { beta, xi } = self.generation {
            if !beta.is_finite() || beta <= 0.0 {
                return Err(invalid(BETA.name, beta, "must be finite and positive"));
            }
            if !xi.is_finite() || xi <= 0.0 {
                return Err(invalid(XI.name, xi, "must be finite and positive"));
            }
        }
        Ok(())
    }
}
