//! WASM bindings for Dcnet Core.
//!
//! JSON in, JSON out, so the editor can call the solver directly.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { solve_dc_json, thevenin_json } from 'dcnet_core';
//!
//! await init();
//!
//! const result = JSON.parse(solve_dc_json(JSON.stringify({ components, nets })));
//! console.log(result.node_voltages.n1);
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::SolveRequest;
use crate::error::DcError;
use crate::solver::{solve_dc, thevenin};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: DcError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_request(request_json: &str) -> Result<SolveRequest, JsValue> {
    let mut request: SolveRequest = serde_json::from_str(request_json).map_err(|e| to_js(e.into()))?;
    request.ensure_nets();
    Ok(request)
}

/// Solve the DC operating point of a JSON request.
///
/// Returns `{node_voltages, branch_currents}` as JSON.
#[wasm_bindgen]
pub fn solve_dc_json(request_json: &str) -> Result<String, JsValue> {
    let request = parse_request(request_json)?;
    let solution = solve_dc(&request.components, &request.nets).map_err(to_js)?;
    serde_json::to_string(&solution).map_err(|e| to_js(e.into()))
}

/// Thevenin equivalent of a JSON request; the request must carry a `port`.
///
/// Returns `{vth, rth, port}` as JSON.
#[wasm_bindgen]
pub fn thevenin_json(request_json: &str) -> Result<String, JsValue> {
    let request = parse_request(request_json)?;
    let port = request
        .port
        .as_ref()
        .ok_or_else(|| to_js(DcError::invalid_port("request has no port")))?;
    let result = thevenin(&request.components, &request.nets, port).map_err(to_js)?;
    serde_json::to_string(&result).map_err(|e| to_js(e.into()))
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
