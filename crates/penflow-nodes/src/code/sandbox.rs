//! Rhai sandbox for the `code` node
//!
//! Every run gets a fresh engine with a fixed capability table: the core
//! language, math, arrays, maps and strings, plus shape constructors,
//! geometry transforms, a seeded PRNG and seeded noise. Rhai's time package
//! is never loaded, so scripts cannot read the clock. The engine has no
//! module resolver, `eval` and `import` are disabled, and `print`/`debug`
//! go to the log. Geometry crosses the boundary as nested
//! arrays: a path is an array of `[x, y]` points.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use penflow_engine::geometry::points_bounds;
use penflow_engine::params::{
    ArcParams, CircleParams, EllipseParams, LineParams, PolygonParams, RectParams,
};
use penflow_engine::{Affine, ColoredPath, PenflowError, Point, Result, ScriptLimits};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rhai::packages::{
    BasicArrayPackage, BasicMapPackage, BasicMathPackage, CorePackage, LogicPackage,
    MoreStringPackage, Package,
};
use rhai::{Array, Dynamic, Engine, EvalAltResult, Map, Scope};

use super::noise::Perlin;
use crate::shapes::{ArcNode, CircleNode, EllipseNode, LineNode, PolygonNode, RectNode};

type ScriptResult<T> = std::result::Result<T, Box<EvalAltResult>>;

fn fail<T>(msg: impl Into<String>) -> ScriptResult<T> {
    let msg: String = msg.into();
    Err(msg.into())
}

fn as_number(v: &Dynamic) -> Option<f64> {
    v.as_float()
        .ok()
        .or_else(|| v.as_int().ok().map(|i| i as f64))
}

fn number(v: &Dynamic, name: &str) -> ScriptResult<f64> {
    match as_number(v) {
        Some(n) => Ok(n),
        None => fail(format!("{} must be a number, got {}", name, v.type_name())),
    }
}

fn count(v: &Dynamic, name: &str) -> ScriptResult<u32> {
    let n = number(v, name)?;
    Ok(n.clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// A finite `[x, y]` pair
fn as_point(v: &Dynamic) -> Option<Point> {
    let pair = v.clone().try_cast::<Array>()?;
    if pair.len() != 2 {
        return None;
    }
    let p = Point::new(as_number(&pair[0])?, as_number(&pair[1])?);
    p.is_finite().then_some(p)
}

fn point_to_dynamic(p: Point) -> Dynamic {
    Dynamic::from_array(vec![Dynamic::from_float(p.x), Dynamic::from_float(p.y)])
}

fn points_to_dynamic(points: &[Point]) -> Dynamic {
    Dynamic::from_array(points.iter().copied().map(point_to_dynamic).collect())
}

/// Upstream geometry as the script sees it
pub fn paths_to_array(paths: &[ColoredPath]) -> Array {
    paths.iter().map(|p| points_to_dynamic(&p.points)).collect()
}

fn read_points(v: &Dynamic) -> ScriptResult<Vec<Point>> {
    let Some(items) = v.clone().try_cast::<Array>() else {
        return fail(format!("expected an array of points, got {}", v.type_name()));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match as_point(item) {
            Some(p) => Ok(p),
            None => fail(format!("point {} is not a pair of finite numbers", i)),
        })
        .collect()
}

/// A path or a collection of paths passed to a transform
enum Shape {
    Single(Vec<Point>),
    Many(Vec<Vec<Point>>),
}

impl Shape {
    fn read(g: &Dynamic) -> ScriptResult<Shape> {
        let Some(items) = g.clone().try_cast::<Array>() else {
            return fail(format!("expected a path or paths, got {}", g.type_name()));
        };
        if items.first().and_then(as_point).is_some() {
            return Ok(Shape::Single(read_points(g)?));
        }
        Ok(Shape::Many(
            items.iter().map(read_points).collect::<ScriptResult<_>>()?,
        ))
    }

    fn points(&self) -> Box<dyn Iterator<Item = Point> + '_> {
        match self {
            Shape::Single(points) => Box::new(points.iter().copied()),
            Shape::Many(paths) => Box::new(paths.iter().flatten().copied()),
        }
    }

    fn centroid(&self) -> Point {
        let (sum, n) = self
            .points()
            .fold((Point::default(), 0usize), |(sum, n), p| (sum.add(p), n + 1));
        if n == 0 {
            Point::default()
        } else {
            sum.scale(1.0 / n as f64)
        }
    }

    fn transformed(&self, t: &Affine) -> Dynamic {
        let map = |points: &Vec<Point>| {
            let moved: Vec<Point> = points.iter().map(|p| t.apply(*p)).collect();
            points_to_dynamic(&moved)
        };
        match self {
            Shape::Single(points) => map(points),
            Shape::Many(paths) => Dynamic::from_array(paths.iter().map(map).collect()),
        }
    }
}

/// Apply the affine built from the shape's centroid
fn transform_with(g: &Dynamic, build: impl FnOnce(Point) -> Affine) -> ScriptResult<Dynamic> {
    let shape = Shape::read(g)?;
    let t = build(shape.centroid());
    Ok(shape.transformed(&t))
}

fn first_path(paths: Vec<ColoredPath>) -> Dynamic {
    paths
        .first()
        .map(|p| points_to_dynamic(&p.points))
        .unwrap_or_else(|| Dynamic::from_array(Array::new()))
}

fn register_shapes(engine: &mut Engine) {
    engine.register_fn(
        "line",
        |x1: Dynamic, y1: Dynamic, x2: Dynamic, y2: Dynamic| -> ScriptResult<Dynamic> {
            Ok(first_path(LineNode::generate(&LineParams {
                x1: number(&x1, "x1")?,
                y1: number(&y1, "y1")?,
                x2: number(&x2, "x2")?,
                y2: number(&y2, "y2")?,
                color: None,
            })))
        },
    );
    engine.register_fn(
        "rect",
        |x: Dynamic, y: Dynamic, w: Dynamic, h: Dynamic| -> ScriptResult<Dynamic> {
            Ok(first_path(RectNode::generate(&RectParams {
                x: number(&x, "x")?,
                y: number(&y, "y")?,
                width: number(&w, "w")?,
                height: number(&h, "h")?,
                color: None,
            })))
        },
    );

    fn circle(cx: &Dynamic, cy: &Dynamic, r: &Dynamic, segments: u32) -> ScriptResult<Dynamic> {
        Ok(first_path(CircleNode::generate(&CircleParams {
            cx: number(cx, "cx")?,
            cy: number(cy, "cy")?,
            radius: number(r, "r")?,
            segments,
            color: None,
        })))
    }
    engine.register_fn("circle", |cx: Dynamic, cy: Dynamic, r: Dynamic| -> ScriptResult<Dynamic> {
        circle(&cx, &cy, &r, CircleParams::default().segments)
    });
    engine.register_fn(
        "circle",
        |cx: Dynamic, cy: Dynamic, r: Dynamic, segments: Dynamic| -> ScriptResult<Dynamic> {
            circle(&cx, &cy, &r, count(&segments, "segments")?)
        },
    );

    fn ellipse(
        cx: &Dynamic,
        cy: &Dynamic,
        rx: &Dynamic,
        ry: &Dynamic,
        segments: u32,
    ) -> ScriptResult<Dynamic> {
        Ok(first_path(EllipseNode::generate(&EllipseParams {
            cx: number(cx, "cx")?,
            cy: number(cy, "cy")?,
            rx: number(rx, "rx")?,
            ry: number(ry, "ry")?,
            rotation: 0.0,
            segments,
            color: None,
        })))
    }
    engine.register_fn(
        "ellipse",
        |cx: Dynamic, cy: Dynamic, rx: Dynamic, ry: Dynamic| -> ScriptResult<Dynamic> {
            ellipse(&cx, &cy, &rx, &ry, EllipseParams::default().segments)
        },
    );
    engine.register_fn(
        "ellipse",
        |cx: Dynamic, cy: Dynamic, rx: Dynamic, ry: Dynamic, segments: Dynamic| -> ScriptResult<Dynamic> {
            ellipse(&cx, &cy, &rx, &ry, count(&segments, "segments")?)
        },
    );

    fn arc(
        cx: &Dynamic,
        cy: &Dynamic,
        r: &Dynamic,
        start: &Dynamic,
        end: &Dynamic,
        segments: u32,
    ) -> ScriptResult<Dynamic> {
        Ok(first_path(ArcNode::generate(&ArcParams {
            cx: number(cx, "cx")?,
            cy: number(cy, "cy")?,
            radius: number(r, "r")?,
            start_angle: number(start, "start")?,
            end_angle: number(end, "end")?,
            segments,
            color: None,
        })))
    }
    engine.register_fn(
        "arc",
        |cx: Dynamic, cy: Dynamic, r: Dynamic, start: Dynamic, end: Dynamic| -> ScriptResult<Dynamic> {
            arc(&cx, &cy, &r, &start, &end, ArcParams::default().segments)
        },
    );
    engine.register_fn(
        "arc",
        |cx: Dynamic, cy: Dynamic, r: Dynamic, start: Dynamic, end: Dynamic, segments: Dynamic| -> ScriptResult<Dynamic> {
            arc(&cx, &cy, &r, &start, &end, count(&segments, "segments")?)
        },
    );

    engine.register_fn(
        "polygon",
        |cx: Dynamic, cy: Dynamic, r: Dynamic, sides: Dynamic| -> ScriptResult<Dynamic> {
            Ok(first_path(PolygonNode::generate(&PolygonParams {
                cx: number(&cx, "cx")?,
                cy: number(&cy, "cy")?,
                radius: number(&r, "r")?,
                sides: count(&sides, "sides")?,
                rotation: 0.0,
                color: None,
            })))
        },
    );
    engine.register_fn("polyline", |points: Dynamic| -> ScriptResult<Dynamic> {
        Ok(points_to_dynamic(&read_points(&points)?))
    });
}

fn register_transforms(engine: &mut Engine) {
    engine.register_fn("translate", |g: Dynamic, dx: Dynamic, dy: Dynamic| -> ScriptResult<Dynamic> {
        let (dx, dy) = (number(&dx, "dx")?, number(&dy, "dy")?);
        transform_with(&g, |_| Affine::translate(dx, dy))
    });
    engine.register_fn("rotate", |g: Dynamic, deg: Dynamic| -> ScriptResult<Dynamic> {
        let deg = number(&deg, "deg")?;
        transform_with(&g, |c| Affine::rotate_about(deg, c))
    });
    engine.register_fn(
        "rotate",
        |g: Dynamic, deg: Dynamic, cx: Dynamic, cy: Dynamic| -> ScriptResult<Dynamic> {
            let deg = number(&deg, "deg")?;
            let pivot = Point::new(number(&cx, "cx")?, number(&cy, "cy")?);
            transform_with(&g, |_| Affine::rotate_about(deg, pivot))
        },
    );
    engine.register_fn("scale", |g: Dynamic, s: Dynamic| -> ScriptResult<Dynamic> {
        let s = number(&s, "s")?;
        transform_with(&g, |c| Affine::scale_about(s, s, c))
    });
    engine.register_fn(
        "scale",
        |g: Dynamic, sx: Dynamic, sy: Dynamic, cx: Dynamic, cy: Dynamic| -> ScriptResult<Dynamic> {
            let (sx, sy) = (number(&sx, "sx")?, number(&sy, "sy")?);
            let pivot = Point::new(number(&cx, "cx")?, number(&cy, "cy")?);
            transform_with(&g, |_| Affine::scale_about(sx, sy, pivot))
        },
    );
    engine.register_fn(
        "transform",
        |g: Dynamic, dx: Dynamic, dy: Dynamic, deg: Dynamic, s: Dynamic| -> ScriptResult<Dynamic> {
            let (dx, dy) = (number(&dx, "dx")?, number(&dy, "dy")?);
            let (deg, s) = (number(&deg, "deg")?, number(&s, "s")?);
            transform_with(&g, |c| {
                Affine::scale_about(s, s, c)
                    .then(Affine::rotate_about(deg, c))
                    .then(Affine::translate(dx, dy))
            })
        },
    );
    engine.register_fn("centroid", |g: Dynamic| -> ScriptResult<Dynamic> {
        Ok(point_to_dynamic(Shape::read(&g)?.centroid()))
    });
    engine.register_fn("bounds", |g: Dynamic| -> ScriptResult<Map> {
        let shape = Shape::read(&g)?;
        let mut map = Map::new();
        if let Some(b) = points_bounds(shape.points()) {
            for (key, value) in [
                ("minX", b.min_x),
                ("minY", b.min_y),
                ("maxX", b.max_x),
                ("maxY", b.max_y),
                ("width", b.width()),
                ("height", b.height()),
            ] {
                map.insert(key.into(), Dynamic::from_float(value));
            }
        }
        Ok(map)
    });
}

fn register_randomness(engine: &mut Engine, seed: u64) {
    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(seed)));

    let state = Rc::clone(&rng);
    engine.register_fn("random", move || -> f64 { state.borrow_mut().gen::<f64>() });

    let state = Rc::clone(&rng);
    engine.register_fn(
        "random",
        move |min: Dynamic, max: Dynamic| -> ScriptResult<f64> {
            let (lo, hi) = (number(&min, "min")?, number(&max, "max")?);
            let u = state.borrow_mut().gen::<f64>();
            Ok(lo + (hi - lo) * u)
        },
    );

    let state = rng;
    engine.register_fn("randomSeed", move |n: Dynamic| -> ScriptResult<()> {
        let n = number(&n, "seed")?;
        *state.borrow_mut() = StdRng::seed_from_u64(n as i64 as u64);
        Ok(())
    });

    let perlin = Perlin::new(seed);
    engine.register_fn("noise", move |x: Dynamic, y: Dynamic| -> ScriptResult<f64> {
        Ok(perlin.noise(number(&x, "x")?, number(&y, "y")?))
    });
}

/// Build the isolated engine for one run
pub fn build_engine(limits: &ScriptLimits, seed: u64) -> Engine {
    let mut engine = Engine::new_raw();
    engine.register_global_module(CorePackage::new().as_shared_module());
    engine.register_global_module(LogicPackage::new().as_shared_module());
    engine.register_global_module(BasicMathPackage::new().as_shared_module());
    engine.register_global_module(BasicArrayPackage::new().as_shared_module());
    engine.register_global_module(BasicMapPackage::new().as_shared_module());
    engine.register_global_module(MoreStringPackage::new().as_shared_module());

    engine.set_max_operations(limits.max_operations);
    engine.set_max_call_levels(limits.max_call_levels);
    engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
    engine.set_max_array_size(limits.max_array_size);
    engine.set_max_map_size(limits.max_array_size);
    engine.set_max_string_size(limits.max_string_size);

    engine.set_module_resolver(rhai::module_resolvers::DummyModuleResolver::new());
    engine.disable_symbol("eval");
    engine.disable_symbol("import");

    engine.on_print(|text| log::debug!("[script] {}", text));
    engine.on_debug(|text, _source, pos| log::debug!("[script] {} @ {}", text, pos));

    register_shapes(&mut engine);
    register_transforms(&mut engine);
    register_randomness(&mut engine, seed);
    engine
}

/// Check a script's return value and convert it to paths
///
/// An array whose elements are all points is one path; otherwise every
/// element must be a path of at least two points.
pub fn validate_result(result: Dynamic) -> Result<Vec<ColoredPath>> {
    let type_name = result.type_name();
    let Some(items) = result.try_cast::<Array>() else {
        return Err(PenflowError::script(format!(
            "result must be an array of paths, got {}",
            type_name
        )));
    };

    if !items.is_empty() && items.iter().all(|item| as_point(item).is_some()) {
        if items.len() < 2 {
            return Err(PenflowError::script("path 0 has fewer than two points"));
        }
        let points = items.iter().filter_map(as_point).collect();
        return Ok(vec![ColoredPath::new(points, None)]);
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let Some(points) = item.clone().try_cast::<Array>() else {
                return Err(PenflowError::script(format!(
                    "path {} must be an array of points, got {}",
                    i,
                    item.type_name()
                )));
            };
            if points.len() < 2 {
                return Err(PenflowError::script(format!(
                    "path {} has fewer than two points",
                    i
                )));
            }
            let parsed = points
                .iter()
                .enumerate()
                .map(|(j, p)| {
                    as_point(p).ok_or_else(|| {
                        PenflowError::script(format!(
                            "path {} point {} must be [x, y] with finite numbers",
                            i, j
                        ))
                    })
                })
                .collect::<Result<Vec<Point>>>()?;
            Ok(ColoredPath::new(parsed, None))
        })
        .collect()
}

/// Run `code` against `inputs`
pub fn run_script(
    code: &str,
    inputs: &[ColoredPath],
    seed: u64,
    limits: &ScriptLimits,
) -> Result<Vec<ColoredPath>> {
    let engine = build_engine(limits, seed);
    let mut scope = Scope::new();
    scope.push("input", paths_to_array(inputs));
    scope.push_constant("PI", PI);

    let result = engine
        .eval_with_scope::<Dynamic>(&mut scope, code)
        .map_err(|e| PenflowError::script(e.to_string()))?;
    validate_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> Result<Vec<ColoredPath>> {
        run_script(code, &[], 1, &ScriptLimits::default())
    }

    fn square() -> Vec<ColoredPath> {
        vec![ColoredPath::new(
            vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(2.0, 2.0)],
            Some(1),
        )]
    }

    #[test]
    fn test_input_passthrough() {
        let out = run_script("input", &square(), 1, &ScriptLimits::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points, square()[0].points);
    }

    #[test]
    fn test_translate_input() {
        let out =
            run_script("translate(input, 10, 0.5)", &square(), 1, &ScriptLimits::default())
                .unwrap();
        assert_eq!(out[0].points[1], Point::new(12.0, 0.5));
    }

    #[test]
    fn test_shapes_accept_integers() {
        let out = run("[line(0, 0, 10, 0), circle(0, 0, 5), circle(0, 0, 5, 8)]").unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].points[1], Point::new(10.0, 0.0));
        assert_eq!(out[1].len(), 65);
        assert_eq!(out[2].len(), 9);
    }

    #[test]
    fn test_single_path_is_wrapped() {
        let out = run("[[0, 0], [1.5, 2]]").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points[1], Point::new(1.5, 2.0));

        let poly = run("polyline([[0, 0], [1, 1], [2, 0]])").unwrap();
        assert_eq!(poly[0].len(), 3);
    }

    #[test]
    fn test_loops_and_math() {
        let out = run(
            r#"
            let paths = [];
            for i in 0..4 {
                let a = i * PI / 2.0;
                paths.push(line(0, 0, cos(a) * 10.0, sin(a) * 10.0));
            }
            paths
            "#,
        )
        .unwrap();
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_bounds_and_centroid() {
        let out = run(
            r#"
            let r = rect(0, 0, 4, 2);
            let b = bounds(r);
            let c = centroid([[0, 0], [4, 2]]);
            [[b.width, b.height], c]
            "#,
        )
        .unwrap();
        assert_eq!(out[0].points, vec![Point::new(4.0, 2.0), Point::new(2.0, 1.0)]);
    }

    #[test]
    fn test_random_is_seeded() {
        let code = "[[random(), random(10, 20)], [noise(0.5, 0.5), random()]]";
        let limits = ScriptLimits::default();
        let a = run_script(code, &[], 42, &limits).unwrap();
        let b = run_script(code, &[], 42, &limits).unwrap();
        let c = run_script(code, &[], 43, &limits).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!((10.0..20.0).contains(&a[0].points[0].y));
    }

    #[test]
    fn test_random_seed_resets_sequence() {
        let out = run("randomSeed(5); let a = random(); randomSeed(5); [[a, random()], [0, 0]]")
            .unwrap();
        assert_eq!(out[0].points[0].x, out[0].points[0].y);
    }

    #[test]
    fn test_result_validation_names_offender() {
        let err = run("42").unwrap_err().to_string();
        assert!(err.contains("array"), "{}", err);

        let err = run(r#"[[[0, 0], [1, "x"]]]"#).unwrap_err().to_string();
        assert!(err.contains("path 0 point 1"), "{}", err);

        let err = run("[line(0, 0, 1, 1), [[0, 0]]]").unwrap_err().to_string();
        assert!(err.contains("path 1"), "{}", err);

        let err = run("[[0, 0]]").unwrap_err().to_string();
        assert!(err.contains("fewer than two"), "{}", err);
    }

    #[test]
    fn test_empty_result_is_allowed() {
        assert!(run("[]").unwrap().is_empty());
    }

    #[test]
    fn test_runaway_script_is_stopped() {
        let limits = ScriptLimits {
            max_operations: 10_000,
            ..ScriptLimits::default()
        };
        assert!(run_script("loop { }", &[], 1, &limits).is_err());
    }

    #[test]
    fn test_eval_and_import_are_unavailable() {
        assert!(run(r#"eval("[]")"#).is_err());
        assert!(run(r#"import "fs" as fs; []"#).is_err());
    }

    #[test]
    fn test_clock_is_unreachable() {
        let err = run("let t = timestamp(); [[t.elapsed, 0.0], [1.0, 1.0]]")
            .unwrap_err()
            .to_string();
        assert!(err.contains("timestamp"), "{}", err);
    }

    #[test]
    fn test_comparisons_and_strings_still_work() {
        let out = run(r#"let n = if 2 > 1 && "ab".len() == 2 { 3.0 } else { 0.0 }; [[n, 0], [0, 0]]"#)
            .unwrap();
        assert_eq!(out[0].points[0], Point::new(3.0, 0.0));
    }

    #[test]
    fn test_syntax_error_is_a_script_error() {
        let err = run("let = ;").unwrap_err();
        assert!(matches!(err, PenflowError::Script(_)));
    }
}
