//! Get rules on reference elements.
//!
//! Triangle rules are symmetric Gauss rules on the unit reference
//! triangle, tabulated by the polynomial degree they integrate exactly.
//! Interval rules are Gauss-Legendre rules mapped to [0, 1]; they drive
//! the one-dimensional integrals left over by the singularity-cancelling
//! coordinate transform.

use crate::quadrature::types::{IntervalRule, QuadratureError, TriangleRule};
use lazy_static::lazy_static;
use std::collections::HashMap;

struct RuleData {
    points: Vec<f64>,
    // Unit-sum convention; scaled to the reference triangle area on lookup.
    weights: Vec<f64>,
}

impl RuleData {
    fn new() -> Self {
        Self {
            points: Vec::new(),
            weights: Vec::new(),
        }
    }

    fn centroid_orbit(mut self, weight: f64) -> Self {
        self.points.extend([1.0 / 3.0, 1.0 / 3.0]);
        self.weights.push(weight);
        self
    }

    // The three points (a, a), (1 - 2a, a), (a, 1 - 2a), one weight each.
    fn corner_orbit(mut self, a: f64, weight: f64) -> Self {
        let b = 1.0 - 2.0 * a;
        self.points.extend([a, a, b, a, a, b]);
        self.weights.extend([weight; 3]);
        self
    }

    // All six permutations of the barycentric triple (c, d, 1 - c - d).
    fn mixed_orbit(mut self, c: f64, d: f64, weight: f64) -> Self {
        let e = 1.0 - c - d;
        self.points.extend([c, d, d, c, c, e, e, c, d, e, e, d]);
        self.weights.extend([weight; 6]);
        self
    }
}

lazy_static! {
    static ref TRIANGLE_RULE_DEFINITIONS: HashMap<usize, RuleData> = {
        HashMap::from([
            (1, RuleData::new().centroid_orbit(1.0)),
            (2, RuleData::new().corner_orbit(1.0 / 6.0, 1.0 / 3.0)),
            (
                3,
                RuleData::new()
                    .centroid_orbit(-27.0 / 48.0)
                    .corner_orbit(0.2, 25.0 / 48.0),
            ),
            (
                4,
                RuleData::new()
                    .corner_orbit(0.445948490915965, 0.223381589678011)
                    .corner_orbit(0.091576213509771, 0.109951743655322),
            ),
            (
                5,
                RuleData::new()
                    .centroid_orbit(0.225)
                    .corner_orbit(0.470142064105115, 0.132394152788506)
                    .corner_orbit(0.101286507323456, 0.125939180544827),
            ),
            (
                6,
                RuleData::new()
                    .corner_orbit(0.249286745170910, 0.116786275726379)
                    .corner_orbit(0.063089014491502, 0.050844906370207)
                    .mixed_orbit(0.310352451033785, 0.053145049844816, 0.082851075618374),
            ),
            (
                7,
                RuleData::new()
                    .centroid_orbit(-0.149570044467682)
                    .corner_orbit(0.260345966079040, 0.175615257433208)
                    .corner_orbit(0.065130102902216, 0.053347235608838)
                    .mixed_orbit(0.638444188569810, 0.048690315425316, 0.077113760890257),
            ),
        ])
    };
}

/// Return the triangle rule that is exact for polynomials of total degree
/// `order`.
///
/// Rules are available for orders 1 to 7. The returned weights sum to 0.5,
/// the area of the reference triangle.
pub fn triangle_rule(order: usize) -> Result<TriangleRule, QuadratureError> {
    if let Some(data) = TRIANGLE_RULE_DEFINITIONS.get(&order) {
        Ok(TriangleRule {
            order,
            npoints: data.weights.len(),
            points: data.points.clone(),
            weights: data.weights.iter().map(|w| 0.5 * w).collect(),
        })
    } else {
        Err(QuadratureError::InvalidOrder(order))
    }
}

/// Return a vector with the orders for which triangle rules are available.
pub fn available_triangle_orders() -> Vec<usize> {
    let mut orders = TRIANGLE_RULE_DEFINITIONS.keys().copied().collect::<Vec<_>>();
    orders.sort_unstable();
    orders
}

/// Return the `npoints`-point Gauss-Legendre rule on [0, 1].
///
/// Rules are available for 1 to 8, 10, 12, 16 and 20 points. The returned
/// weights sum to 1.
pub fn interval_rule(npoints: usize) -> Result<IntervalRule, QuadratureError> {
    let (x, w) = gauss_legendre(npoints)?;
    Ok(IntervalRule {
        npoints,
        points: x.iter().map(|x| 0.5 * (x + 1.0)).collect(),
        weights: w.iter().map(|w| 0.5 * w).collect(),
    })
}

/// Return a vector with the point counts for which interval rules are
/// available.
pub fn available_interval_rules() -> Vec<usize> {
    vec![1, 2, 3, 4, 5, 6, 7, 8, 10, 12, 16, 20]
}

fn gauss_legendre(n: usize) -> Result<(&'static [f64], &'static [f64]), QuadratureError> {
    match n {
        1 => Ok((&GL1_X, &GL1_W)),
        2 => Ok((&GL2_X, &GL2_W)),
        3 => Ok((&GL3_X, &GL3_W)),
        4 => Ok((&GL4_X, &GL4_W)),
        5 => Ok((&GL5_X, &GL5_W)),
        6 => Ok((&GL6_X, &GL6_W)),
        7 => Ok((&GL7_X, &GL7_W)),
        8 => Ok((&GL8_X, &GL8_W)),
        10 => Ok((&GL10_X, &GL10_W)),
        12 => Ok((&GL12_X, &GL12_W)),
        16 => Ok((&GL16_X, &GL16_W)),
        20 => Ok((&GL20_X, &GL20_W)),
        _ => Err(QuadratureError::InvalidOrder(n)),
    }
}

// Gauss-Legendre abscissas and weights on [-1, 1].
#[allow(clippy::excessive_precision)]
mod tables {
    pub(super) static GL1_X: [f64; 1] = [0.0];
    pub(super) static GL1_W: [f64; 1] = [2.0];

    pub(super) static GL2_X: [f64; 2] = [-0.5773502691896257, 0.5773502691896257];
    pub(super) static GL2_W: [f64; 2] = [1.0, 1.0];

    pub(super) static GL3_X: [f64; 3] = [-0.7745966692414834, 0.0, 0.7745966692414834];
    pub(super) static GL3_W: [f64; 3] =
        [0.5555555555555556, 0.8888888888888888, 0.5555555555555556];

    pub(super) static GL4_X: [f64; 4] = [
        -0.8611363115940526,
        -0.3399810435848563,
        0.3399810435848563,
        0.8611363115940526,
    ];
    pub(super) static GL4_W: [f64; 4] = [
        0.3478548451374538,
        0.6521451548625461,
        0.6521451548625461,
        0.3478548451374538,
    ];

    pub(super) static GL5_X: [f64; 5] = [
        -0.9061798459386640,
        -0.5384693101056831,
        0.0,
        0.5384693101056831,
        0.9061798459386640,
    ];
    pub(super) static GL5_W: [f64; 5] = [
        0.2369268850561891,
        0.4786286704993665,
        0.5688888888888889,
        0.4786286704993665,
        0.2369268850561891,
    ];

    pub(super) static GL6_X: [f64; 6] = [
        -0.9324695142031521,
        -0.6612093864662645,
        -0.2386191860831969,
        0.2386191860831969,
        0.6612093864662645,
        0.9324695142031521,
    ];
    pub(super) static GL6_W: [f64; 6] = [
        0.1713244923791704,
        0.3607615730481386,
        0.4679139345726910,
        0.4679139345726910,
        0.3607615730481386,
        0.1713244923791704,
    ];

    pub(super) static GL7_X: [f64; 7] = [
        -0.9491079123427585,
        -0.7415311855993945,
        -0.4058451513773972,
        0.0,
        0.4058451513773972,
        0.7415311855993945,
        0.9491079123427585,
    ];
    pub(super) static GL7_W: [f64; 7] = [
        0.1294849661688697,
        0.2797053914892766,
        0.3818300505051189,
        0.4179591836734694,
        0.3818300505051189,
        0.2797053914892766,
        0.1294849661688697,
    ];

    pub(super) static GL8_X: [f64; 8] = [
        -0.9602898564975363,
        -0.7966664774136267,
        -0.5255324099163290,
        -0.1834346424956498,
        0.1834346424956498,
        0.5255324099163290,
        0.7966664774136267,
        0.9602898564975363,
    ];
    pub(super) static GL8_W: [f64; 8] = [
        0.1012285362903763,
        0.2223810344533745,
        0.3137066458778873,
        0.3626837833783620,
        0.3626837833783620,
        0.3137066458778873,
        0.2223810344533745,
        0.1012285362903763,
    ];

    pub(super) static GL10_X: [f64; 10] = [
        -0.9739065285171717,
        -0.8650633666889845,
        -0.6794095682990244,
        -0.4333953941292472,
        -0.1488743389816312,
        0.1488743389816312,
        0.4333953941292472,
        0.6794095682990244,
        0.8650633666889845,
        0.9739065285171717,
    ];
    pub(super) static GL10_W: [f64; 10] = [
        0.0666713443086881,
        0.1494513491505806,
        0.2190863625159820,
        0.2692667193099963,
        0.2955242247147529,
        0.2955242247147529,
        0.2692667193099963,
        0.2190863625159820,
        0.1494513491505806,
        0.0666713443086881,
    ];

    pub(super) static GL12_X: [f64; 12] = [
        -0.9815606342467192,
        -0.9041172563704749,
        -0.7699026741943047,
        -0.5873179542866175,
        -0.3678314989981802,
        -0.1252334085114689,
        0.1252334085114689,
        0.3678314989981802,
        0.5873179542866175,
        0.7699026741943047,
        0.9041172563704749,
        0.9815606342467192,
    ];
    pub(super) static GL12_W: [f64; 12] = [
        0.0471753363865118,
        0.1069393259953184,
        0.1600783285433462,
        0.2031674267230659,
        0.2334925365383548,
        0.2491470458134028,
        0.2491470458134028,
        0.2334925365383548,
        0.2031674267230659,
        0.1600783285433462,
        0.1069393259953184,
        0.0471753363865118,
    ];

    pub(super) static GL16_X: [f64; 16] = [
        -0.9894009349916499,
        -0.9445750230732326,
        -0.8656312023878318,
        -0.7554044083550030,
        -0.6178762444026438,
        -0.4580167776572274,
        -0.2816035507792589,
        -0.0950125098376374,
        0.0950125098376374,
        0.2816035507792589,
        0.4580167776572274,
        0.6178762444026438,
        0.7554044083550030,
        0.8656312023878318,
        0.9445750230732326,
        0.9894009349916499,
    ];
    pub(super) static GL16_W: [f64; 16] = [
        0.0271524594117541,
        0.0622535239386479,
        0.0951585116824928,
        0.1246289712555339,
        0.1495959888165767,
        0.1691565193950025,
        0.1826034150449236,
        0.1894506104550685,
        0.1894506104550685,
        0.1826034150449236,
        0.1691565193950025,
        0.1495959888165767,
        0.1246289712555339,
        0.0951585116824928,
        0.0622535239386479,
        0.0271524594117541,
    ];

    pub(super) static GL20_X: [f64; 20] = [
        -0.9931285991850949,
        -0.9639719272779138,
        -0.9122344282513259,
        -0.8391169718222188,
        -0.7463319064601508,
        -0.6360536807265150,
        -0.5108670019508271,
        -0.3737060887154195,
        -0.2277858511416451,
        -0.0765265211334973,
        0.0765265211334973,
        0.2277858511416451,
        0.3737060887154195,
        0.5108670019508271,
        0.6360536807265150,
        0.7463319064601508,
        0.8391169718222188,
        0.9122344282513259,
        0.9639719272779138,
        0.9931285991850949,
    ];
    pub(super) static GL20_W: [f64; 20] = [
        0.0176140071391521,
        0.0406014298003869,
        0.0626720483341091,
        0.0832767415767048,
        0.1019301198172404,
        0.1181945319615184,
        0.1316886384491766,
        0.1420961093183820,
        0.1491729864726037,
        0.1527533871307258,
        0.1527533871307258,
        0.1491729864726037,
        0.1420961093183820,
        0.1316886384491766,
        0.1181945319615184,
        0.1019301198172404,
        0.0832767415767048,
        0.0626720483341091,
        0.0406014298003869,
        0.0176140071391521,
    ];
}

use tables::{
    GL10_W, GL10_X, GL12_W, GL12_X, GL16_W, GL16_X, GL1_W, GL1_X, GL20_W, GL20_X, GL2_W, GL2_X,
    GL3_W, GL3_X, GL4_W, GL4_X, GL5_W, GL5_X, GL6_W, GL6_X, GL7_W, GL7_X, GL8_W, GL8_X,
};

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use paste::paste;

    macro_rules! test_triangle_order {
        ($($order:literal),+) => {
            $(
                paste! {
                    #[test]
                    fn [<test_triangle_rule_order_ $order>]() {
                        let rule = triangle_rule($order).unwrap();
                        assert_eq!(rule.weights.len(), rule.npoints);
                        assert_eq!(rule.points.len(), 2 * rule.npoints);

                        // Weights sum to the reference triangle area.
                        let total: f64 = rule.weights.iter().sum();
                        assert_relative_eq!(total, 0.5, max_relative = 1e-14);

                        // All points inside the reference triangle.
                        for i in 0..rule.npoints {
                            let ([u, v, w], _) = rule.point(i);
                            assert!(u >= 0.0 && v >= 0.0 && w >= -1e-15);
                        }

                        // The rule integrates u^order exactly; the integral
                        // over the reference triangle is
                        // 1 / ((order + 1) * (order + 2)).
                        let mut integral = 0.0;
                        for i in 0..rule.npoints {
                            let ([u, _, _], w) = rule.point(i);
                            integral += w * u.powi($order as i32);
                        }
                        let exact = 1.0 / (($order as f64 + 1.0) * ($order as f64 + 2.0));
                        assert_relative_eq!(integral, exact, max_relative = 1e-13);
                    }
                }
            )*
        };
    }

    test_triangle_order!(1, 2, 3, 4, 5, 6, 7);

    #[test]
    fn test_unsupported_triangle_order() {
        assert!(matches!(
            triangle_rule(0),
            Err(QuadratureError::InvalidOrder(0))
        ));
        assert!(matches!(
            triangle_rule(8),
            Err(QuadratureError::InvalidOrder(8))
        ));
    }

    #[test]
    fn test_available_triangle_orders() {
        assert_eq!(available_triangle_orders(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_interval_rules_integrate_polynomials() {
        for npoints in available_interval_rules() {
            let rule = interval_rule(npoints).unwrap();

            let total: f64 = rule.weights.iter().sum();
            assert_relative_eq!(total, 1.0, max_relative = 1e-13);

            // Exact for x^(2n - 1); the integral over [0, 1] is 1 / (2n).
            let degree = (2 * npoints - 1) as i32;
            let mut integral = 0.0;
            for (x, w) in rule.points.iter().zip(&rule.weights) {
                integral += w * x.powi(degree);
            }
            assert_relative_eq!(
                integral,
                1.0 / (2.0 * npoints as f64),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_unsupported_interval_rule() {
        assert!(matches!(
            interval_rule(0),
            Err(QuadratureError::InvalidOrder(0))
        ));
        assert!(matches!(
            interval_rule(9),
            Err(QuadratureError::InvalidOrder(9))
        ));
    }
}
