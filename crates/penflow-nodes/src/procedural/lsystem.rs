//! L-system generator
//!
//! Rewrites an axiom with `LHS=RHS` rules, then walks the expansion with a
//! turtle that stamps a copy of the upstream geometry at every draw symbol.
//!
//! | Symbol | Effect |
//! |--------|--------|
//! | `F`, `G` | place a copy, then advance |
//! | `f` | advance without placing |
//! | `+` / `-` | turn by `angle` / `-angle` |
//! | `[` / `]` | push / pop position, heading and scale |
//! | `\|` | turn around |
//! | `>` / `<` | multiply / divide scale by `scaleFactor` |

use std::collections::HashMap;

use penflow_engine::geometry::bounds;
use penflow_engine::params::LSystemParams;
use penflow_engine::{
    Affine, ColoredPath, EngineLimits, NodeDescriptor, NodeKind, NodeMetadata, Point,
    PortDataType, PortMetadata,
};

pub struct LSystemNode;

impl LSystemNode {
    pub const PORT_INPUT: &'static str = "in";

    pub fn generate(
        p: &LSystemParams,
        inputs: &[ColoredPath],
        limits: &EngineLimits,
    ) -> Vec<ColoredPath> {
        let Some(input_bounds) = bounds(inputs) else {
            return Vec::new();
        };
        let rules = parse_rules(&p.rules);
        let iterations = (p.iterations as usize).min(limits.lsystem_max_iterations);
        let program = expand(&p.axiom, &rules, iterations, limits.lsystem_max_length);
        log::debug!(
            "L-system expanded to {} symbols after {} iterations",
            program.chars().count(),
            iterations
        );
        interpret(&program, p, inputs, input_bounds.center(), limits.lsystem_max_paths)
    }
}

impl NodeDescriptor for LSystemNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(
            NodeKind::LSystem,
            "L-System",
            "Stamps the input along a rewritten turtle program",
        )
        .with_input(PortMetadata::required(Self::PORT_INPUT, "Motif", PortDataType::Geometry).multiple())
        .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(LSystemNode::descriptor));

/// Parse `A=AB,B=A` notation; entries without a single-symbol left side
/// are ignored
pub fn parse_rules(rules: &str) -> HashMap<char, String> {
    rules
        .split(',')
        .filter_map(|rule| {
            let (lhs, rhs) = rule.split_once('=')?;
            let mut symbols = lhs.trim().chars();
            let symbol = symbols.next()?;
            if symbols.next().is_some() {
                return None;
            }
            Some((symbol, rhs.chars().filter(|c| !c.is_whitespace()).collect()))
        })
        .collect()
}

/// Apply `rules` to `axiom` `iterations` times
///
/// Stops as soon as an expansion reaches `max_length` symbols, truncating
/// it there.
pub fn expand(
    axiom: &str,
    rules: &HashMap<char, String>,
    iterations: usize,
    max_length: usize,
) -> String {
    let mut current: String = axiom.chars().take(max_length).collect();
    for _ in 0..iterations {
        let mut next = String::with_capacity(current.len() * 2);
        let mut length = 0usize;
        let mut truncated = false;
        'symbols: for symbol in current.chars() {
            let replacement = rules.get(&symbol);
            let symbols: Box<dyn Iterator<Item = char>> = match replacement {
                Some(rhs) => Box::new(rhs.chars()),
                None => Box::new(std::iter::once(symbol)),
            };
            for c in symbols {
                if length == max_length {
                    truncated = true;
                    break 'symbols;
                }
                next.push(c);
                length += 1;
            }
        }
        current = next;
        if truncated {
            log::debug!("L-system expansion truncated at {} symbols", max_length);
            break;
        }
    }
    current
}

#[derive(Debug, Clone, Copy)]
struct Turtle {
    position: Point,
    heading: f64,
    scale: f64,
}

fn interpret(
    program: &str,
    p: &LSystemParams,
    motif: &[ColoredPath],
    motif_center: Point,
    max_paths: usize,
) -> Vec<ColoredPath> {
    let mut turtle = Turtle {
        position: Point::new(p.start_x, p.start_y),
        heading: p.start_angle,
        scale: 1.0,
    };
    let mut stack: Vec<Turtle> = Vec::new();
    let mut out: Vec<ColoredPath> = Vec::new();

    for symbol in program.chars() {
        match symbol {
            'F' | 'G' => {
                let placement = Affine::translate(-motif_center.x, -motif_center.y)
                    .then(Affine::scale(turtle.scale, turtle.scale))
                    .then(Affine::rotate(turtle.heading - p.start_angle))
                    .then(Affine::translate(turtle.position.x, turtle.position.y));
                for path in motif {
                    if out.len() >= max_paths {
                        log::warn!("L-system hit the {} path cap", max_paths);
                        return out;
                    }
                    out.push(path.map_points(|pt| placement.apply(pt)));
                }
                advance(&mut turtle, p.step_length);
            }
            'f' => advance(&mut turtle, p.step_length),
            '+' => turtle.heading += p.angle,
            '-' => turtle.heading -= p.angle,
            '|' => turtle.heading += 180.0,
            '[' => stack.push(turtle),
            ']' => {
                if let Some(saved) = stack.pop() {
                    turtle = saved;
                }
            }
            '>' => turtle.scale *= p.scale_factor,
            '<' => {
                if p.scale_factor != 0.0 {
                    turtle.scale /= p.scale_factor;
                }
            }
            _ => {}
        }
    }
    out
}

fn advance(turtle: &mut Turtle, step_length: f64) {
    let (sin, cos) = turtle.heading.to_radians().sin_cos();
    let distance = step_length * turtle.scale;
    turtle.position = Point::new(
        turtle.position.x + distance * cos,
        turtle.position.y + distance * sin,
    );
}
