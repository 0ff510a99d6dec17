// demos/demo.rs
use mc_pricer::analytics::bs_analytic;
use mc_pricer::analytics::convergence::convergence_study;
use mc_pricer::math_utils::Timer;
use mc_pricer::mc::mc_engine::{mc_price_option_gbm, mc_simulate_and_price, McConfig};
use mc_pricer::mc::paths::SimulationScheme;
use mc_pricer::mc::payoffs::OptionType;
use mc_pricer::output;

fn main() {
    println!("Running mc-pricer Monte Carlo Demo\n");

    let cfg_call = McConfig {
        paths: 10_000,
        steps: 100,
        s0: 100.0,
        r: 0.05,
        q: 0.02,
        sigma: 0.25,
        t: 0.5,
        strike: 110.0,
        option_type: OptionType::Call,
        seed: 42,
        scheme: SimulationScheme::Vectorized,
        parallel: false,
    };

    let timer = Timer::new();
    let (paths, call) = mc_simulate_and_price(&cfg_call).expect("Valid configuration");
    let elapsed = timer.elapsed_ms();
    let analytic_call = cfg_call.analytic_price();
    let (lo, hi) = call.confidence_interval(1.96);

    println!("European Call (K = {})", cfg_call.strike);
    println!("  Expected payoff:  {:.6}", call.expected_payoff);
    println!("  MC price:         {:.6} ± {:.6}", call.option_price, call.std_error);
    println!("  95% interval:     [{:.6}, {:.6}]", lo, hi);
    println!("  Black-Scholes:    {:.6}", analytic_call);
    println!("  Time:             {:.2} ms\n", elapsed);

    let cfg_put = McConfig {
        option_type: OptionType::Put,
        ..cfg_call.clone()
    };
    let put = mc_price_option_gbm(&cfg_put).expect("Valid configuration");
    let parity = bs_analytic::put_call_parity_gap(
        cfg_call.s0,
        cfg_call.strike,
        cfg_call.t,
        cfg_call.r,
        cfg_call.q,
    );
    println!("European Put (K = {})", cfg_put.strike);
    println!("  MC price:         {:.6} ± {:.6}", put.option_price, put.std_error);
    println!("  Black-Scholes:    {:.6}", cfg_put.analytic_price());
    println!(
        "  Parity check:     C - P = {:.6}, S·e^(-qT) - K·e^(-rT) = {:.6}\n",
        call.option_price - put.option_price,
        parity
    );

    let mean_path = paths.mean_path();
    println!(
        "Mean simulated path: S(dt) = {:.4}, S(T) = {:.4}, forward = {:.4}\n",
        mean_path[0],
        mean_path[mean_path.len() - 1],
        cfg_call.s0 * ((cfg_call.r - cfg_call.q) * cfg_call.t).exp()
    );

    let counts = [100, 1_000, 10_000, 100_000];
    let points = convergence_study(&cfg_call, &counts).expect("Valid configuration");
    println!("{:>10} {:>12} {:>12} {:>12}", "Paths", "MC Price", "Std Error", "Abs Error");
    for p in &points {
        println!(
            "{:>10} {:>12.6} {:>12.6} {:>12.6}",
            p.paths, p.mc_price, p.std_error, p.abs_error
        );
    }

    if let Err(e) = output::write_mean_path_to_csv("mean_path.csv", &paths) {
        eprintln!("Could not write mean_path.csv: {}", e);
    } else {
        println!("\nMean path written to mean_path.csv");
    }
}
