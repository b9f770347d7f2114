use hashbrown::HashMap;
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Rint,
    Atan2,
    Pow,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Arity::Exactly(1) => "exactly 1",
            Arity::Exactly(2) => "exactly 2",
            Arity::Exactly(3) => "exactly 3",
            Arity::AtLeast(2) => "at least 2",
            _ => "a different number of",
        }
    }
}

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    HashMap::from([
        ("sin", Builtin::Sin),
        ("cos", Builtin::Cos),
        ("tan", Builtin::Tan),
        ("asin", Builtin::Asin),
        ("acos", Builtin::Acos),
        ("atan", Builtin::Atan),
        ("sinh", Builtin::Sinh),
        ("cosh", Builtin::Cosh),
        ("tanh", Builtin::Tanh),
        ("exp", Builtin::Exp),
        ("log", Builtin::Log),
        ("ln", Builtin::Log),
        ("log10", Builtin::Log10),
        ("log2", Builtin::Log2),
        ("sqrt", Builtin::Sqrt),
        ("abs", Builtin::Abs),
        ("sign", Builtin::Sign),
        ("floor", Builtin::Floor),
        ("ceil", Builtin::Ceil),
        ("rint", Builtin::Rint),
        ("atan2", Builtin::Atan2),
        ("pow", Builtin::Pow),
        ("min", Builtin::Min),
        ("max", Builtin::Max),
    ])
});

/// Names that are reserved by the expression language and cannot be used
/// as variables or user constants.
pub fn is_reserved(name: &str) -> bool {
    name == "if" || BUILTINS.contains_key(name)
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        BUILTINS.get(name).copied()
    }

    pub fn arity(self) -> Arity {
        match self {
            Builtin::Atan2 | Builtin::Pow => Arity::Exactly(2),
            Builtin::Min | Builtin::Max => Arity::AtLeast(2),
            _ => Arity::Exactly(1),
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Builtin::Sin => args[0].sin(),
            Builtin::Cos => args[0].cos(),
            Builtin::Tan => args[0].tan(),
            Builtin::Asin => args[0].asin(),
            Builtin::Acos => args[0].acos(),
            Builtin::Atan => args[0].atan(),
            Builtin::Sinh => args[0].sinh(),
            Builtin::Cosh => args[0].cosh(),
            Builtin::Tanh => args[0].tanh(),
            Builtin::Exp => args[0].exp(),
            Builtin::Log => args[0].ln(),
            Builtin::Log10 => args[0].log10(),
            Builtin::Log2 => args[0].log2(),
            Builtin::Sqrt => args[0].sqrt(),
            Builtin::Abs => args[0].abs(),
            Builtin::Sign => {
                if args[0] > 0.0 {
                    1.0
                } else if args[0] < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Builtin::Floor => args[0].floor(),
            Builtin::Ceil => args[0].ceil(),
            Builtin::Rint => args[0].round_ties_even(),
            Builtin::Atan2 => args[0].atan2(args[1]),
            Builtin::Pow => args[0].powf(args[1]),
            Builtin::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Builtin::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Compiled expression tree. Variables are resolved to argument slots at
/// compile time, so evaluation never looks up names.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    Variable(usize),
    Unary(UnaryOperator, Box<Expr>),
    Binary(BinaryOperator, Box<Expr>, Box<Expr>),
    Call(Builtin, Vec<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// Runtime fault raised while walking the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    DivisionByZero,
}

fn truth(value: f64) -> bool {
    value != 0.0
}

fn from_bool(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

impl Expr {
    pub fn eval(&self, args: &[f64]) -> Result<f64, Fault> {
        match self {
            Expr::Constant(value) => Ok(*value),
            Expr::Variable(slot) => Ok(args[*slot]),
            Expr::Unary(op, operand) => {
                let v = operand.eval(args)?;
                Ok(match op {
                    UnaryOperator::Negate => -v,
                    UnaryOperator::Not => from_bool(!truth(v)),
                })
            }
            Expr::Binary(BinaryOperator::And, lhs, rhs) => {
                Ok(from_bool(truth(lhs.eval(args)?) && truth(rhs.eval(args)?)))
            }
            Expr::Binary(BinaryOperator::Or, lhs, rhs) => {
                Ok(from_bool(truth(lhs.eval(args)?) || truth(rhs.eval(args)?)))
            }
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval(args)?;
                let b = rhs.eval(args)?;
                Ok(match op {
                    BinaryOperator::Add => a + b,
                    BinaryOperator::Subtract => a - b,
                    BinaryOperator::Multiply => a * b,
                    BinaryOperator::Divide => {
                        if b == 0.0 {
                            return Err(Fault::DivisionByZero);
                        }
                        a / b
                    }
                    BinaryOperator::Modulo => {
                        if b == 0.0 {
                            return Err(Fault::DivisionByZero);
                        }
                        a % b
                    }
                    BinaryOperator::Power => a.powf(b),
                    BinaryOperator::Less => from_bool(a < b),
                    BinaryOperator::LessEqual => from_bool(a <= b),
                    BinaryOperator::Greater => from_bool(a > b),
                    BinaryOperator::GreaterEqual => from_bool(a >= b),
                    BinaryOperator::Equal => from_bool(a == b),
                    BinaryOperator::NotEqual => from_bool(a != b),
                    BinaryOperator::And | BinaryOperator::Or => unreachable!(),
                })
            }
            Expr::Call(function, arguments) => {
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(argument.eval(args)?);
                }
                Ok(function.apply(&values))
            }
            Expr::If(condition, then_branch, else_branch) => {
                if truth(condition.eval(args)?) {
                    then_branch.eval(args)
                } else {
                    else_branch.eval(args)
                }
            }
        }
    }

    fn is_constant(&self) -> bool {
        matches!(self, Expr::Constant(_))
    }

    /// Collapse a node whose children are all constants. Nodes that would
    /// fault are left alone so the fault surfaces at evaluation time.
    pub fn fold(self) -> Self {
        let foldable = match &self {
            Expr::Constant(_) | Expr::Variable(_) => false,
            Expr::Unary(_, operand) => operand.is_constant(),
            Expr::Binary(_, lhs, rhs) => lhs.is_constant() && rhs.is_constant(),
            Expr::Call(_, arguments) => arguments.iter().all(Expr::is_constant),
            Expr::If(condition, _, _) => condition.is_constant(),
        };
        if !foldable {
            return self;
        }
        if let Expr::If(condition, then_branch, else_branch) = self {
            return match condition.eval(&[]) {
                Ok(c) if truth(c) => *then_branch,
                _ => *else_branch,
            };
        }
        match self.eval(&[]) {
            Ok(value) => Expr::Constant(value),
            Err(_) => self,
        }
    }
}
