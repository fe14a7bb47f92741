// line-oriented gate programs
//
//   # comments start with '#' or ';'
//   H 0
//   RX 1 1.5707963
//   CNOT 1 0            (control first)
//   CTRL 2,3 X 0        (extra controls on any instruction)
//   U1 0 <8 floats>     (row-major re/im pairs)
//   U2 1 0 <32 floats>

use num_complex::Complex64;

use crate::error::{KernelError, Result};
use crate::gates::{self, Gate};
use crate::kernel::{Matrix2, Matrix4};

// all supported instructions
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // single qubit gates
    H(usize),
    X(usize),
    Y(usize),
    Z(usize),
    S(usize),
    T(usize),
    Phase(usize, f64),
    Rx(usize, f64),
    Ry(usize, f64),
    Rz(usize, f64),
    U1(usize, Matrix2),

    // two qubit gates, most significant qubit first
    Cnot(usize, usize),
    Cz(usize, usize),
    Swap(usize, usize),
    CPhase(usize, usize, f64),
    U2(usize, usize, Matrix4),

    // additional control qubits around any of the above
    Controlled(Vec<usize>, Box<Instruction>),
}

impl Instruction {
    /// The gate to run and the control qubits it is conditioned on.
    pub fn to_gate(&self) -> (Gate, Vec<usize>) {
        use Instruction::*;
        let gate = match self {
            H(q) => Gate::single(*q, gates::hadamard()),
            X(q) => Gate::single(*q, gates::pauli_x()),
            Y(q) => Gate::single(*q, gates::pauli_y()),
            Z(q) => Gate::single(*q, gates::pauli_z()),
            S(q) => Gate::single(*q, gates::s_gate()),
            T(q) => Gate::single(*q, gates::t_gate()),
            Phase(q, angle) => Gate::single(*q, gates::phase(*angle)),
            Rx(q, angle) => Gate::single(*q, gates::rx(*angle)),
            Ry(q, angle) => Gate::single(*q, gates::ry(*angle)),
            Rz(q, angle) => Gate::single(*q, gates::rz(*angle)),
            U1(q, m) => Gate::single(*q, *m),
            Cnot(c, t) => Gate::two(*c, *t, gates::cnot()),
            Cz(a, b) => Gate::two(*a, *b, gates::cz()),
            Swap(a, b) => Gate::two(*a, *b, gates::swap()),
            CPhase(a, b, angle) => Gate::two(*a, *b, gates::controlled_phase(*angle)),
            U2(hi, lo, m) => Gate::two(*hi, *lo, *m),
            Controlled(..) => {
                // flattened without recursion, however deeply the wrappers nest
                let mut controls = Vec::new();
                let mut instr = self;
                while let Controlled(outer, inner) = instr {
                    controls.extend_from_slice(outer);
                    instr = inner.as_ref();
                }
                let (gate, _) = instr.to_gate();
                return (gate, controls);
            }
        };
        (gate, Vec::new())
    }
}

fn parse_qubit(s: &str) -> std::result::Result<usize, String> {
    s.parse::<usize>()
        .map_err(|_| format!("invalid qubit index '{}'", s))
}

fn parse_f64(s: &str) -> std::result::Result<f64, String> {
    s.parse::<f64>().map_err(|_| format!("invalid number '{}'", s))
}

fn parse_complexes(tokens: &[&str]) -> std::result::Result<Vec<Complex64>, String> {
    tokens
        .chunks(2)
        .map(|pair| Ok(Complex64::new(parse_f64(pair[0])?, parse_f64(pair[1])?)))
        .collect()
}

/// Parses one non-empty, comment-free instruction line.
///
/// Any number of leading `CTRL <q,q,...>` prefixes are merged into a single
/// `Instruction::Controlled` around the gate that follows them.
pub fn parse_instruction(line: &str) -> std::result::Result<Instruction, String> {
    let all: Vec<&str> = line.split_whitespace().collect();
    let mut tokens = &all[..];

    let mut controls = Vec::new();
    while tokens.first().is_some_and(|t| t.eq_ignore_ascii_case("CTRL")) {
        if tokens.len() < 3 {
            return Err("malformed CTRL instruction. usage: CTRL <q,q,...> <instruction>".into());
        }
        for q in tokens[1].split(',').filter(|s| !s.is_empty()) {
            controls.push(parse_qubit(q)?);
        }
        tokens = &tokens[2..];
    }

    let gate = parse_gate(tokens)?;
    if controls.is_empty() {
        Ok(gate)
    } else {
        Ok(Instruction::Controlled(controls, Box::new(gate)))
    }
}

// a single gate, no CTRL prefix
fn parse_gate(tokens: &[&str]) -> std::result::Result<Instruction, String> {
    if tokens.is_empty() {
        return Err("empty instruction line".into());
    }

    let opcode = tokens[0].to_uppercase();
    let args = &tokens[1..];

    let check_arity = |count: usize, usage: &str| {
        if args.len() == count {
            Ok(())
        } else {
            Err(format!("malformed {} instruction. usage: {}", opcode, usage))
        }
    };

    match opcode.as_str() {
        "H" | "X" | "Y" | "Z" | "S" | "T" => {
            check_arity(1, &format!("{} <qubit>", opcode))?;
            let q = parse_qubit(args[0])?;
            Ok(match opcode.as_str() {
                "H" => Instruction::H(q),
                "X" => Instruction::X(q),
                "Y" => Instruction::Y(q),
                "Z" => Instruction::Z(q),
                "S" => Instruction::S(q),
                _ => Instruction::T(q),
            })
        }
        "PH" | "RX" | "RY" | "RZ" => {
            check_arity(2, &format!("{} <qubit> <angle>", opcode))?;
            let q = parse_qubit(args[0])?;
            let angle = parse_f64(args[1])?;
            Ok(match opcode.as_str() {
                "PH" => Instruction::Phase(q, angle),
                "RX" => Instruction::Rx(q, angle),
                "RY" => Instruction::Ry(q, angle),
                _ => Instruction::Rz(q, angle),
            })
        }
        "CNOT" | "CZ" | "SWAP" => {
            check_arity(2, &format!("{} <qubit> <qubit>", opcode))?;
            let a = parse_qubit(args[0])?;
            let b = parse_qubit(args[1])?;
            Ok(match opcode.as_str() {
                "CNOT" => Instruction::Cnot(a, b),
                "CZ" => Instruction::Cz(a, b),
                _ => Instruction::Swap(a, b),
            })
        }
        "CPHASE" => {
            check_arity(3, "CPHASE <qubit> <qubit> <angle>")?;
            Ok(Instruction::CPhase(
                parse_qubit(args[0])?,
                parse_qubit(args[1])?,
                parse_f64(args[2])?,
            ))
        }
        "U1" => {
            check_arity(9, "U1 <qubit> <8 floats, row-major re im>")?;
            let c = parse_complexes(&args[1..])?;
            Ok(Instruction::U1(parse_qubit(args[0])?, [[c[0], c[1]], [c[2], c[3]]]))
        }
        "U2" => {
            check_arity(34, "U2 <high> <low> <32 floats, row-major re im>")?;
            let c = parse_complexes(&args[2..])?;
            let m: Matrix4 = std::array::from_fn(|r| std::array::from_fn(|k| c[4 * r + k]));
            Ok(Instruction::U2(parse_qubit(args[0])?, parse_qubit(args[1])?, m))
        }
        _ => Err(format!("unknown instruction '{}'", tokens[0])),
    }
}

/// Parses a whole program, skipping blank lines and comments.
pub fn parse_program(src: &str) -> Result<Vec<Instruction>> {
    let mut program = Vec::new();
    for (idx, raw) in src.lines().enumerate() {
        let line = raw
            .split(['#', ';'])
            .next()
            .unwrap_or_default()
            .trim();
        if line.is_empty() {
            continue;
        }
        let instr = parse_instruction(line).map_err(|message| KernelError::Parse {
            line: idx + 1,
            message,
        })?;
        program.push(instr);
    }
    Ok(program)
}
