//! Sentence pooling over token embeddings.
//!
//! Rows of a batch are pooled independently. For `hidden` of shape `[B,T,H]`
//! and `attention_mask` of shape `[B,T]`, row `b` of the `[B,H]` output is
//!
//! ```text
//! v_b = sum_t(mask[b,t] * hidden[b,t,:]) / max(1, sum_t mask[b,t])
//! out_b = v_b / (|v_b| + eps)
//! ```
//!
//! so padding tokens never contribute, and a row that is all padding pools
//! to the zero vector instead of NaN.
use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, tokens, hidden_dim) = hidden.dims3()?;
    ensure!(
        attention_mask.dims() == [batch, tokens].as_slice(),
        "mask shape {:?} does not match hidden [{batch}, {tokens}, _]",
        attention_mask.dims()
    );

    // [B,T] -> [B,T,1] so it broadcasts across the hidden axis
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;

    let one = Tensor::ones((1, 1), hidden.dtype(), hidden.device())?;
    let counts = mask.sum_keepdim(1)?.broadcast_maximum(&one)?;
    let mean = summed.broadcast_div(&counts)?;

    let eps = match hidden.dtype() {
        DType::F16 | DType::BF16 => 1e-6,
        _ => 1e-12,
    };
    let norms = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + eps)?;
    let pooled = mean.broadcast_div(&norms)?;
    ensure!(pooled.dims() == [batch, hidden_dim].as_slice(), "pooled shape {:?} != [{batch}, {hidden_dim}]", pooled.dims());
    Ok(pooled)
}
