use axon_error::{AxonResult, axon_bail};

/// Node activation functions, selected by name from the
/// `activation_options` config set.
///
/// `gauss` is `e^(x^2)`, matching the reference behavior this engine
/// reproduces rather than the conventional `e^(-x^2)`.
pub fn activate_value(x: f32, method: &str) -> AxonResult<f32> {
    let value = match method {
        "linear" => x,
        "sigmoid" => 1.0 / (1.0 + (-x).exp()),
        "tanh" => x.tanh(),
        "sin" => x.sin(),
        "gauss" => (x * x).exp(),
        "relu" => {
            if x > 0.0 {
                x
            } else {
                0.0
            }
        }
        "softplus" => x.exp().ln_1p(),
        "clamped" => x.clamp(-1.0, 1.0),
        "abs" => x.abs(),
        "square" => x * x,
        "cubed" => x * x * x,
        _ => axon_bail!(UnknownMethod: "invalid activation '{}' provided", method),
    };

    Ok(value)
}

/// Returns whether `method` names a known activation function.
pub fn is_valid_activation(method: &str) -> bool {
    matches!(
        method,
        "linear"
            | "sigmoid"
            | "tanh"
            | "sin"
            | "gauss"
            | "relu"
            | "softplus"
            | "clamped"
            | "abs"
            | "square"
            | "cubed"
    )
}
