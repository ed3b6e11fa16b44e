use crate::foundation::error::{SplitError, SplitResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Merge a local layer over a remote layer, using local depth as the cutout mask.
///
/// Where `local_depth` is below `far` the local pixel is composited over the remote one;
/// elsewhere the remote pixel passes through untouched.
pub(crate) fn cutout_over_row(
    dst: &mut [u8],
    remote: &[u8],
    local: &[u8],
    local_depth: &[f32],
    far: f32,
) -> SplitResult<()> {
    if dst.len() != remote.len() || dst.len() != local.len() || dst.len() != local_depth.len() * 4
    {
        return Err(SplitError::compositor(
            "cutout_over_row expects equal-length rgba8 rows and a matching depth row",
        ));
    }
    for (((d, r), l), &z) in dst
        .chunks_exact_mut(4)
        .zip(remote.chunks_exact(4))
        .zip(local.chunks_exact(4))
        .zip(local_depth)
    {
        let r = [r[0], r[1], r[2], r[3]];
        let out = if z < far {
            over(r, [l[0], l[1], l[2], l[3]])
        } else {
            r
        };
        d.copy_from_slice(&out);
    }
    Ok(())
}
