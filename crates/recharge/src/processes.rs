//! Pure process equations for the soil-moisture recharge model.
//!
//! All fluxes are amounts per time step (rate times `dt`).

/// Splits precipitation into `(rain, snowfall)` with a threshold temperature.
pub fn partition_precipitation(precip: f64, temp: f64, tt: f64) -> (f64, f64) {
    if temp < tt { (0.0, precip) } else { (precip, 0.0) }
}

/// Degree-day melt `k (T - tt) dt`, limited by the snow pack.
pub fn snow_melt(snowpack: f64, temp: f64, tt: f64, k: f64, dt: f64) -> f64 {
    (k * (temp - tt) * dt).max(0.0).min(snowpack)
}

/// Interception bucket update.
///
/// Returns `(new_storage, effective_precipitation, interception_evaporation)`.
/// Water above `simax` passes through as effective precipitation; the
/// bucket then evaporates up to `ep`.
pub fn interception(storage: f64, precip: f64, ep: f64, simax: f64) -> (f64, f64, f64) {
    let filled = storage + precip;
    let pe = (filled - simax).max(0.0);
    let after = filled - pe;
    let ei = after.min(ep.max(0.0));
    (after - ei, pe, ei)
}

/// Actual root-zone evaporation: potential demand reduced linearly below
/// `lp * srmax`.
pub fn root_zone_evaporation(storage: f64, ep: f64, srmax: f64, lp: f64, kv: f64) -> f64 {
    let ratio = (storage / (lp * srmax)).min(1.0).max(0.0);
    ep.max(0.0) * kv * ratio
}

/// Percolation to groundwater `ks (Sr / srmax)^gamma dt`.
pub fn percolation(storage: f64, srmax: f64, ks: f64, gamma: f64, dt: f64) -> f64 {
    ks * (storage / srmax).max(0.0).powf(gamma) * dt
}

/// Outcome of one explicit root-zone update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootZoneStep {
    /// Storage after the step, within `[0, srmax]`.
    pub storage: f64,
    /// Actual evaporation.
    pub evaporation: f64,
    /// Percolation (recharge).
    pub percolation: f64,
    /// Overflow above `srmax`.
    pub runoff: f64,
    /// `true` if the storage fell below zero and was clamped.
    pub clipped: bool,
}

/// Explicit update `Sr' = Sr + Pe - Ea - R`, clamped to `[0, srmax]`.
///
/// Overflow above `srmax` becomes runoff. A negative storage scales the
/// outgoing fluxes down so the water balance still closes.
pub fn root_zone_step(
    storage: f64,
    inflow: f64,
    evaporation: f64,
    percolation: f64,
    srmax: f64,
) -> RootZoneStep {
    let next = storage + inflow - evaporation - percolation;
    if next > srmax {
        return RootZoneStep {
            storage: srmax,
            evaporation,
            percolation,
            runoff: next - srmax,
            clipped: false,
        };
    }
    if next < 0.0 {
        let available = storage + inflow;
        let scale = if evaporation + percolation > 0.0 {
            available / (evaporation + percolation)
        } else {
            0.0
        };
        return RootZoneStep {
            storage: 0.0,
            evaporation: evaporation * scale,
            percolation: percolation * scale,
            runoff: 0.0,
            clipped: true,
        };
    }
    RootZoneStep {
        storage: next,
        evaporation,
        percolation,
        runoff: 0.0,
        clipped: false,
    }
}
