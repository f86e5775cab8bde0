#[cfg(test)]
mod tests {
    use expect_test::expect;
    use itertools::Itertools;
    use morse_tree::morse::*;
    use morse_tree::{Insertion, MorseError};

    fn morse() -> Standard {
        Standard::new().unwrap()
    }

    #[test]
    fn code_table() {
        let table = morse()
            .table()
            .into_iter()
            .map(|(c, code)| format!("{c} {code}"))
            .join("\n");
        let expect = expect![[r#"
            5 .....
            H ....
            4 ....-
            S ...
            V ...-
            3 ...--
            I ..
            F ..-.
            U ..-
            2 ..---
            E .
            L .-..
            R .-.
            + .-.-.
            A .-
            P .--.
            W .--
            J .---
            1 .----
            6 -....
            B -...
            = -...-
            D -..
            / -..-.
            X -..-
            N -.
            C -.-.
            K -.-
            Y -.--
            T -
            7 --...
            Z --..
            G --.
            Q --.-
            M --
            8 ---..
            O ---
            9 ----.
            0 -----"#]];
        expect.assert_eq(&table);
    }

    #[test]
    fn tree_shape() {
        let morse = morse();
        assert_eq!(morse.tree().size(), 44);
        let expect = expect![[r#"
                                -> {0}
                            -> { }
                                -> {9}
                        -> {O}
                            -> { }
                                -> {8}
                    -> {M}
                            -> {Q}
                        -> {G}
                            -> {Z}
                                -> {7}
                -> {T}
                            -> {Y}
                        -> {K}
                            -> {C}
                    -> {N}
                            -> {X}
                                -> {/}
                        -> {D}
                                -> {=}
                            -> {B}
                                -> {6}
            -> {~}
                                -> {1}
                            -> {J}
                        -> {W}
                            -> {P}
                    -> {A}
                            -> { }
                                -> {+}
                        -> {R}
                            -> {L}
                -> {E}
                                -> {2}
                            -> { }
                        -> {U}
                            -> {F}
                    -> {I}
                                -> {3}
                            -> {V}
                        -> {S}
                                -> {4}
                            -> {H}
                                -> {5}
        "#]];
        expect.assert_eq(&morse.render());
    }

    #[test]
    fn every_character_round_trips_through_lookup() {
        let morse = morse();
        for c in Itu::PRIORITY.chars() {
            assert_eq!(morse.tree().lookup(&c), Ok(&c));
            assert_eq!(morse.tree().lookup(&c.to_ascii_lowercase()), Ok(&c));
        }
    }

    #[test]
    fn encode_plain() {
        let morse = morse();
        assert_eq!(morse.encode("SOS", Flags::NONE).unwrap(), "...---...");
        assert_eq!(morse.encode("sos", Flags::NONE).unwrap(), "...---...");
        let expect = expect!["......-......-.."];
        let encoded = morse.encode("Hi there", Flags::NONE);
        expect.assert_eq(&encoded.unwrap());
    }

    #[test]
    fn encode_with_separators() {
        let morse = morse();
        let expect = expect![". . .   - - -   . . . "];
        let encoded = morse.encode("SOS", Flags::SEPARATORS);
        expect.assert_eq(&encoded.unwrap());
        let expect = expect![". . . .   . .       -   . . . .   .   . - .   . "];
        let encoded = morse.encode("Hi there", Flags::SEPARATORS);
        expect.assert_eq(&encoded.unwrap());
    }

    #[test]
    fn encode_with_prosigns() {
        let morse = morse();
        let expect = expect!["-.-.-.--.....--.....--....--.----...--.-.---..---.....-...-.-"];
        let encoded = morse.encode("What hath God wrought", Flags::PROSIGNS);
        expect.assert_eq(&encoded.unwrap());
        let expect = expect!["- . - . -       . - -   . . . .   . -   -       . . . .   . -   -   . . . .       - - .   - - -   - . .       . - -   . - .   - - -   . . -   - - .   . . . .   -       . . . - . - "];
        let encoded = morse.encode("What hath God wrought", Flags::ALL);
        expect.assert_eq(&encoded.unwrap());
    }

    #[test]
    fn encode_skips_fillers_and_unknown_characters() {
        let morse = morse();
        assert_eq!(
            morse.encode("(a) [b] ~c", Flags::NONE).unwrap(),
            ".--...-.-."
        );
        assert_eq!(morse.encode("?!", Flags::NONE).unwrap(), "");
        assert_eq!(
            morse.encode("", Flags::ALL).unwrap(),
            "- . - . -             . . . - . - "
        );
    }

    #[test]
    fn encode_char() {
        let morse = morse();
        assert_eq!(morse.encode_char('0', false).unwrap(), "-----");
        assert_eq!(morse.encode_char('e', true).unwrap(), ". ");
        // fillers keep the tree shape but have no code of their own
        assert_eq!(
            morse.encode_char('~', false),
            Err(MorseError::Unencodable('~'))
        );
        assert_eq!(
            morse.encode_char('(', false),
            Err(MorseError::Unencodable('('))
        );
        assert_eq!(
            morse.encode_char('?', false),
            Err(MorseError::Unencodable('?'))
        );
    }

    #[test]
    fn decode_plain() {
        let morse = morse();
        assert_eq!(morse.decode("... --- ...", Flags::NONE), "SOS");
        assert_eq!(
            morse.decode(".... ..  - .... . .-. .", Flags::NONE),
            "HI THERE"
        );
        assert_eq!(morse.decode("   .... ..   ", Flags::NONE), "HI");
        // no character is nine symbols deep
        assert_eq!(morse.decode("...---...", Flags::NONE), "");
    }

    #[test]
    fn decode_ignores_garbage() {
        let morse = morse();
        assert_eq!(morse.decode(".-.-.x ..", Flags::NONE), "+I");
        assert_eq!(morse.decode("-.-. ....... .", Flags::NONE), "CE");
        assert_eq!(morse.decode("", Flags::SEPARATORS), "");
    }

    #[test]
    fn decode_with_separators() {
        let morse = morse();
        assert_eq!(
            morse.decode(". . .   - - -   . . . ", Flags::SEPARATORS),
            "SOS"
        );
        let encoded = morse.encode("What hath God wrought", Flags::ALL).unwrap();
        // the prosigns themselves do not decode to a character
        assert_eq!(
            morse.decode(&encoded, Flags::SEPARATORS),
            "WHAT HATH GOD WROUGHT"
        );
    }

    #[test]
    fn round_trip_every_character() {
        let morse = morse();
        let message = Itu::PRIORITY
            .chars()
            .filter(|&c| Standard::is_encodable(c))
            .join("");
        for flags in [Flags::NONE, Flags::SEPARATORS] {
            let encoded = message
                .chars()
                .map(|c| morse.encode_char(c, flags.separators).unwrap())
                .join(if flags.separators { "  " } else { " " });
            assert_eq!(morse.decode(&encoded, flags), message);
        }
    }

    #[test]
    fn decode_char() {
        let morse = morse();
        assert_eq!(morse.decode_char(".-"), Ok('A'));
        assert_eq!(morse.decode_char(". -"), Ok('A'));
        // fillers decode to themselves
        assert_eq!(morse.decode_char("---."), Ok('('));
        assert!(morse.decode_char("-.--.").is_err());
        assert_eq!(
            morse.decode_char(".-x"),
            Err(MorseError::InvalidCode(".-x".to_string()))
        );
        assert!(morse.decode_char("......").is_err());
    }

    #[test]
    fn forgotten_characters_neither_encode_nor_decode() {
        let mut morse = morse();
        morse.forget('s').unwrap();
        assert_eq!(morse.tree().size(), 44);
        assert_eq!(
            morse.encode("SOS", Flags::NONE),
            Err(MorseError::Unencodable('S'))
        );
        assert!(morse.decode_char("...").is_err());
        assert_eq!(morse.decode("... --- ...", Flags::NONE), "O");
        // children of a hidden node stay reachable
        assert_eq!(morse.encode_char('H', false).unwrap(), "....");
        assert!(morse.render().contains("-> [S]"));

        assert_eq!(morse.learn('s'), Ok(Insertion::Revived));
        assert_eq!(morse.learn('s'), Ok(Insertion::Duplicate('S')));
        assert_eq!(morse.encode("SOS", Flags::NONE).unwrap(), "...---...");
        assert_eq!(morse.tree().size(), 44);
    }

    #[test]
    fn forget_rejects_characters_outside_the_alphabet() {
        let mut morse = morse();
        assert_eq!(morse.forget('?'), Err(MorseError::Unencodable('?')));
        assert_eq!(morse.learn('~'), Err(MorseError::Unencodable('~')));
    }
}
