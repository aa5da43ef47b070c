//! Annealing driver.
//!
//! # Algorithm
//!
//! Isotropic mode, per sample:
//! 1. `x' = x + s * d` with `d ~ U[-sqrt(3), sqrt(3))^n`
//! 2. Metropolis test at the current temperature
//! 3. Record the best cost, cool, stop at `max_cooling_iterations`
//!
//! and after every `num_cost_samples` samples, stop if the best-cost trace
//! has plateaued.
//!
//! Adaptive mode, per temperature level:
//! 1. `num_cost_samples` times: `x' = x + s * (A * d)`, Metropolis test,
//!    record the candidate cost and the resulting current state
//! 2. Stop if nothing was accepted
//! 3. Re-estimate `A` from the recorded states, cool once
//! 4. Stop on a plateau of candidate costs, or at `max_cooling_iterations`

use std::collections::HashMap;

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::acceptance::{acceptance_probability, metropolis};
use super::adaptation::{AdaptationMatrix, SampleHistory};
use super::candidate::CandidateGenerator;
use super::config::{CandidateGeneration, SaConfig};
use super::convergence::is_converged;
use super::error::SaError;
use super::state::{AnnealState, Temperature};
use super::types::{
    LevelEvent, ObjectiveFunction, OptimPoint, SaObserver, SampleEvent, Termination,
};

/// Result of an annealing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaResult {
    /// The best state found.
    pub best: Vec<f64>,

    /// Cost of the best state.
    pub best_cost: f64,

    /// Why the run stopped.
    pub termination: Termination,

    /// Candidate evaluations (the three initial evaluations excluded).
    pub evaluations: usize,

    /// Number of times the temperature was lowered.
    pub cooling_iterations: usize,

    /// Completed temperature levels of `num_cost_samples` samples each.
    pub levels: usize,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of moves that improved the best state.
    pub improving_moves: usize,

    /// Temperature when the run stopped.
    pub final_temperature: f64,

    /// Best cost at the end of every completed level, plus the final best.
    pub cost_history: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
struct RunStats {
    evaluations: usize,
    cooling_iterations: usize,
    levels: usize,
    accepted_moves: usize,
    improving_moves: usize,
    cost_history: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Step {
    probability: f64,
    accepted: bool,
    improved: bool,
}

#[derive(Debug, Clone)]
struct AdaptiveState {
    matrix: AdaptationMatrix,
    beta: f64,
    xi: f64,
}

/// Everything that is (re)allocated when an initial guess is set.
#[derive(Debug, Clone)]
struct Run {
    guess: Vec<f64>,
    state: AnnealState,
    temperature: Temperature,
    rng: StdRng,
    generator: CandidateGenerator,
    history: SampleHistory,
    adaptive: Option<AdaptiveState>,
    evaluated: bool,
}

impl Run {
    fn new(config: &SaConfig, guess: Vec<f64>) -> Self {
        let dim = guess.len();
        let adaptive = match config.generation {
            CandidateGeneration::Isotropic => None,
            CandidateGeneration::Adaptive { beta, xi } => Some(AdaptiveState {
                matrix: AdaptationMatrix::identity(dim),
                beta,
                xi,
            }),
        };
        Self {
            state: AnnealState::new(&guess),
            temperature: Temperature::new(config.initial_temperature),
            rng: StdRng::seed_from_u64(config.seed),
            generator: CandidateGenerator::new(dim, config.step_length_factor),
            history: SampleHistory::new(config.num_cost_samples, dim, adaptive.is_some()),
            adaptive,
            evaluated: false,
            guess,
        }
    }

    fn evaluate_initial<F: ObjectiveFunction>(&mut self, objective: &F) {
        self.state.current_cost = objective.cost(&self.state.current);
        self.state.candidate_cost = objective.cost(&self.state.candidate);
        self.state.best_cost = objective.cost(&self.state.best);
        self.evaluated = true;
    }

    /// Evaluates the pending candidate and applies the Metropolis test.
    fn evaluate_candidate<F: ObjectiveFunction>(
        &mut self,
        config: &SaConfig,
        objective: &F,
        stats: &mut RunStats,
    ) -> Step {
        self.state.candidate_cost = objective.cost(&self.state.candidate);
        stats.evaluations += 1;

        let probability = acceptance_probability(
            self.state.current_cost,
            self.state.candidate_cost,
            self.temperature.value(),
            config.direction,
        );
        let accepted = metropolis(probability, &mut self.rng);
        let mut improved = false;
        if accepted {
            improved = self.state.accept_candidate(config.direction);
            stats.accepted_moves += 1;
            if improved {
                stats.improving_moves += 1;
            }
        }
        Step {
            probability,
            accepted,
            improved,
        }
    }

    fn sample_event(&self, level: usize, sample: usize, step: &Step) -> SampleEvent<'_> {
        SampleEvent {
            level,
            sample,
            candidate: &self.state.candidate,
            candidate_cost: self.state.candidate_cost,
            current_cost: self.state.current_cost,
            best_cost: self.state.best_cost,
            temperature: self.temperature.value(),
            acceptance_probability: step.probability,
            accepted: step.accepted,
            improved: step.improved,
        }
    }

    fn finish_level<O: SaObserver>(
        &self,
        accepted: usize,
        observer: &mut O,
        stats: &mut RunStats,
    ) {
        let event = LevelEvent {
            level: stats.levels,
            temperature: self.temperature.value(),
            accepted,
            best_cost: self.state.best_cost,
        };
        debug!(
            level = event.level,
            temperature = event.temperature,
            accepted,
            best_cost = event.best_cost,
            "temperature level complete"
        );
        stats.levels += 1;
        stats.cost_history.push(self.state.best_cost);
        observer.on_level(&event);
    }

    fn anneal_isotropic<F: ObjectiveFunction, O: SaObserver>(
        &mut self,
        config: &SaConfig,
        objective: &F,
        observer: &mut O,
        stats: &mut RunStats,
    ) -> Termination {
        loop {
            let level = stats.levels;
            let mut accepted = 0usize;

            for i in 0..config.num_cost_samples {
                self.generator.isotropic(
                    &self.state.current,
                    &mut self.state.candidate,
                    &mut self.rng,
                );
                let step = self.evaluate_candidate(config, objective, stats);
                if step.accepted {
                    accepted += 1;
                }
                self.history.record_cost(i, self.state.best_cost);
                observer.on_sample(&self.sample_event(level, i, &step));

                self.temperature.cool(config.cooling_factor);
                stats.cooling_iterations += 1;
                if stats.cooling_iterations >= config.max_cooling_iterations {
                    if i + 1 == config.num_cost_samples {
                        self.finish_level(accepted, observer, stats);
                    }
                    return Termination::MaxCoolingIter;
                }
            }

            self.finish_level(accepted, observer, stats);
            if is_converged(
                self.history.costs(),
                config.convergence_relative_tolerance,
            ) {
                return Termination::Convergence;
            }
        }
    }

    fn anneal_adaptive<F: ObjectiveFunction, O: SaObserver>(
        &mut self,
        adaptive: &mut AdaptiveState,
        config: &SaConfig,
        objective: &F,
        observer: &mut O,
        stats: &mut RunStats,
    ) -> Result<Termination, SaError> {
        loop {
            let level = stats.levels;
            let mut accepted = 0usize;

            for i in 0..config.num_cost_samples {
                self.generator.adaptive(
                    &self.state.current,
                    &mut self.state.candidate,
                    adaptive.matrix.matrix(),
                    &mut self.rng,
                );
                let step = self.evaluate_candidate(config, objective, stats);
                if step.accepted {
                    accepted += 1;
                }
                self.history.record_cost(i, self.state.candidate_cost);
                self.history.record_state(i, &self.state.current);
                observer.on_sample(&self.sample_event(level, i, &step));
            }

            if accepted == 0 {
                return Ok(Termination::NoCandidateAccepted);
            }

            adaptive
                .matrix
                .update(
                    self.history.states(),
                    adaptive.beta,
                    adaptive.xi,
                    stats.cooling_iterations,
                )
                .inspect_err(|err| warn!(level, %err, "adaptation matrix update failed"))?;

            self.temperature.cool(config.cooling_factor);
            stats.cooling_iterations += 1;
            self.finish_level(accepted, observer, stats);

            if is_converged(
                self.history.costs(),
                config.convergence_relative_tolerance,
            ) {
                return Ok(Termination::Convergence);
            }
            if stats.cooling_iterations >= config.max_cooling_iterations {
                return Ok(Termination::MaxCoolingIter);
            }
        }
    }

    fn anneal<F: ObjectiveFunction, O: SaObserver>(
        &mut self,
        config: &SaConfig,
        objective: &F,
        observer: &mut O,
    ) -> Result<SaResult, SaError> {
        self.evaluate_initial(objective);
        let mut stats = RunStats {
            cost_history: vec![self.state.best_cost],
            ..RunStats::default()
        };

        let termination = match self.adaptive.take() {
            None => self.anneal_isotropic(config, objective, observer, &mut stats),
            Some(mut adaptive) => {
                let outcome =
                    self.anneal_adaptive(&mut adaptive, config, objective, observer, &mut stats);
                self.adaptive = Some(adaptive);
                outcome?
            }
        };

        let best_cost = self.state.best_cost;
        if stats
            .cost_history
            .last()
            .is_none_or(|&last| last.to_bits() != best_cost.to_bits())
        {
            stats.cost_history.push(best_cost);
        }

        info!(
            %termination,
            evaluations = stats.evaluations,
            levels = stats.levels,
            best_cost,
            "annealing finished"
        );

        Ok(SaResult {
            best: self.state.best.clone(),
            best_cost,
            termination,
            evaluations: stats.evaluations,
            cooling_iterations: stats.cooling_iterations,
            levels: stats.levels,
            accepted_moves: stats.accepted_moves,
            improving_moves: stats.improving_moves,
            final_temperature: self.temperature.value(),
            cost_history: stats.cost_history,
        })
    }
}

/// Stateful annealing optimizer.
///
/// The lifecycle is: configure, supply the objective, set an initial guess,
/// [`anneal`](Self::anneal), then read the optimum with
/// [`optim_point`](Self::optim_point). Setting a new initial guess resets
/// the state vectors, temperature, PRNG and adaptation matrix; calling
/// `anneal` again without one continues from where the previous run stopped.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{SaConfig, SaOptimizer, Termination};
///
/// let config = SaConfig::default()
///     .with_seed(1)
///     .with_initial_temperature(1.0)
///     .with_cooling_factor(0.99)
///     .with_step_length_factor(0.1)
///     .with_num_cost_samples(20)
///     .with_max_cooling_iterations(2_000);
///
/// // maximize -(x^2 + y^2)
/// let objective = |x: &[f64]| -(x[0] * x[0] + x[1] * x[1]);
///
/// let mut optimizer = SaOptimizer::new(config, objective).unwrap();
/// optimizer.set_initial_guess(vec![2.0, -1.0]).unwrap();
/// let termination = optimizer.anneal().unwrap();
///
/// let optimum = optimizer.optim_point().unwrap();
/// assert!(optimum.cost >= -5.0);
/// assert_eq!(optimum.state.len(), 2);
/// assert!(matches!(
///     termination,
///     Termination::Convergence | Termination::MaxCoolingIter
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct SaOptimizer<F> {
    config: SaConfig,
    objective: F,
    run: Option<Run>,
    last_result: Option<SaResult>,
}

impl<F: ObjectiveFunction> SaOptimizer<F> {
    /// Creates an optimizer from a validated configuration.
    pub fn new(config: SaConfig, objective: F) -> Result<Self, SaError> {
        config.validate()?;
        Ok(Self {
            config,
            objective,
            run: None,
            last_result: None,
        })
    }

    /// Creates an optimizer from named options; see [`SaConfig::from_params`].
    pub fn from_params(params: &HashMap<String, f64>, objective: F) -> Result<Self, SaError> {
        Self::new(SaConfig::from_params(params)?, objective)
    }

    /// Replaces the configuration from named options.
    ///
    /// If an initial guess was already set, the run state is rebuilt from
    /// it under the new configuration.
    pub fn set_params(&mut self, params: &HashMap<String, f64>) -> Result<(), SaError> {
        self.set_config(SaConfig::from_params(params)?)
    }

    /// Replaces the configuration. See [`set_params`](Self::set_params).
    pub fn set_config(&mut self, config: SaConfig) -> Result<(), SaError> {
        config.validate()?;
        self.config = config;
        if let Some(run) = self.run.take() {
            self.run = Some(Run::new(&self.config, run.guess));
        }
        Ok(())
    }

    pub fn set_objective(&mut self, objective: F) {
        self.objective = objective;
    }

    /// Sets the starting point and fixes the dimension of the search space.
    pub fn set_initial_guess(&mut self, guess: Vec<f64>) -> Result<(), SaError> {
        if guess.is_empty() {
            return Err(SaError::EmptyInitialGuess);
        }
        self.run = Some(Run::new(&self.config, guess));
        self.last_result = None;
        Ok(())
    }

    /// Runs annealing to completion.
    pub fn anneal(&mut self) -> Result<Termination, SaError> {
        self.anneal_with_observer(&mut ())
    }

    /// Runs annealing to completion, reporting every sample and level to
    /// `observer`.
    pub fn anneal_with_observer<O: SaObserver>(
        &mut self,
        observer: &mut O,
    ) -> Result<Termination, SaError> {
        let result = self.run_to_completion(observer)?;
        let termination = result.termination;
        self.last_result = Some(result);
        Ok(termination)
    }

    fn run_to_completion<O: SaObserver>(&mut self, observer: &mut O) -> Result<SaResult, SaError> {
        let run = self.run.as_mut().ok_or(SaError::NoInitialGuess)?;
        run.anneal(&self.config, &self.objective, observer)
    }

    /// The best point found so far, once the objective has been evaluated.
    pub fn optim_point(&self) -> Option<OptimPoint> {
        let run = self.run.as_ref().filter(|run| run.evaluated)?;
        Some(OptimPoint {
            state: run.state.best.clone(),
            cost: run.state.best_cost,
        })
    }

    /// Statistics of the last successful run.
    pub fn last_result(&self) -> Option<&SaResult> {
        self.last_result.as_ref()
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    /// Current temperature, once an initial guess is set.
    pub fn temperature(&self) -> Option<f64> {
        self.run.as_ref().map(|run| run.temperature.value())
    }

    /// Current adaptation matrix (adaptive mode only).
    pub fn adaptation_matrix(&self) -> Option<&DMatrix<f64>> {
        self.run
            .as_ref()
            .and_then(|run| run.adaptive.as_ref())
            .map(|adaptive| adaptive.matrix.matrix())
    }
}

/// One-shot entry point: configure, anneal from `initial_guess`, return the
/// result.
pub struct SaRunner;

impl SaRunner {
    /// Runs annealing.
    pub fn run<F: ObjectiveFunction>(
        objective: F,
        config: &SaConfig,
        initial_guess: Vec<f64>,
    ) -> Result<SaResult, SaError> {
        Self::run_with_observer(objective, config, initial_guess, &mut ())
    }

    /// Runs annealing with an observer.
    pub fn run_with_observer<F: ObjectiveFunction, O: SaObserver>(
        objective: F,
        config: &SaConfig,
        initial_guess: Vec<f64>,
        observer: &mut O,
    ) -> Result<SaResult, SaError> {
        let mut optimizer = SaOptimizer::new(config.clone(), objective)?;
        optimizer.set_initial_guess(initial_guess)?;
        optimizer.run_to_completion(observer)
    }
}
