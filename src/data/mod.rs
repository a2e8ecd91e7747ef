/// Data layer: table loading, reconciliation and value resolution.
///
/// Architecture:
/// ```text
///  gdp.csv      codes.csv        plot_countries.json
///     │             │                   │
///     ▼             ▼                   ▼
///   ┌─────────────────────────────────────┐
///   │  loader    parse tables → model      │
///   └─────────────────────────────────────┘
///     │             │                   │
///     │             ▼                   │
///     │      ┌────────────┐             │
///     │      │ translate  │  plot code → data code
///     │      └────────────┘             │
///     ▼             ▼                   ▼
///   ┌─────────────────────────────────────┐
///   │  reconcile   by name / by code       │  → matched + unmatched
///   └─────────────────────────────────────┘
///                   │
///                   ▼
///   ┌─────────────────────────────────────┐
///   │  resolve     year field → log10     │  → values + unmatched + no value
///   └─────────────────────────────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod reconcile;
pub mod resolve;
pub mod translate;
