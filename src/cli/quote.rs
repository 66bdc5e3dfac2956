//! Cart pricing command

use super::util::{
    has_flag, load_cart, load_catalog, load_config, parse_output_arg, positional, write_output,
};
use shipfee::*;

pub fn cmd_quote(args: &[String]) -> Result<()> {
    let paths = positional(args);
    if paths.len() < 2 {
        return Err(
            "Usage: shipfee quote <zones.yaml> <cart.yaml> [--json] [--output <file>]".into(),
        );
    }

    let config = load_config(args)?;
    let catalog = load_catalog(paths[0])?;
    let cart = load_cart(paths[1])?;

    let calculator = FeeCalculator::new(config.calculator_options());
    let quote = calculator.compute_with_catalog(&cart, &catalog)?;

    let content = if has_flag(args, "--json") {
        serde_json::to_string_pretty(&quote)?
    } else {
        quote.to_report()
    };

    write_output(&parse_output_arg(args), &content)
}
